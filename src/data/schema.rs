// Schema definition and field type inference
// Author: Gabriel Demetrios Lafis

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{coerce, DataError, Row, Value};

/// Field type, assigned once at ingestion
///
/// Each variant carries its own comparison and canonicalization strategy, so
/// callers resolve the type once per field and reuse it for every cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Number,
    String,
    Date,
}

impl FieldType {
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Number => "number",
            FieldType::String => "string",
            FieldType::Date => "date",
        }
    }

    /// Ascending comparison of two cells under this type.
    ///
    /// Cells that fail to coerce sort after every coercible cell and tie
    /// with each other.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        match self {
            FieldType::Number => compare_options(a.as_number(), b.as_number()),
            FieldType::Date => compare_options(a.as_date(), b.as_date()),
            FieldType::String => compare_text(&a.to_string(), &b.to_string()),
        }
    }

    /// Value used for a missing cell after cleaning
    pub fn default_value(&self) -> Value {
        match self {
            FieldType::Number => Value::Number(0.0),
            FieldType::String => Value::Text(String::new()),
            FieldType::Date => Value::Missing,
        }
    }

    /// Coerce a cell to the canonical form of this type
    pub fn canonicalize(&self, value: &Value) -> Value {
        if value.is_missing() {
            return self.default_value();
        }

        match self {
            FieldType::Number => Value::Number(value.as_number().unwrap_or(0.0)),
            FieldType::String => Value::Text(value.to_string().trim().to_string()),
            FieldType::Date => value
                .as_date()
                .map_or(Value::Missing, |dt| Value::Date(dt.date())),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FieldType {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "number" => Ok(FieldType::Number),
            "string" => Ok(FieldType::String),
            "date" => Ok(FieldType::Date),
            _ => Err(DataError::NotSupported(format!("Unknown field type: {}", s))),
        }
    }
}

fn compare_options<T: PartialOrd>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// Case-insensitive first, lowercase before uppercase on ties
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Represents a field in a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl Field {
    /// Create a new field
    pub fn new<S: Into<String>>(name: S, field_type: FieldType) -> Self {
        Field {
            name: name.into(),
            field_type,
        }
    }
}

/// Ordered list of fields; order defines column order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema with the given fields
    pub fn new(fields: Vec<Field>) -> Self {
        Schema { fields }
    }

    /// Get a reference to a field by name
    pub fn get_field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Declared type of a field
    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.get_field_by_name(name).map(|f| f.field_type)
    }

    /// Number of fields of the given type
    pub fn count_of(&self, field_type: FieldType) -> usize {
        self.fields
            .iter()
            .filter(|f| f.field_type == field_type)
            .count()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Schema builder for creating schemas
pub struct SchemaBuilder {
    fields: Vec<Field>,
}

impl SchemaBuilder {
    /// Create a new schema builder
    pub fn new() -> Self {
        SchemaBuilder { fields: Vec::new() }
    }

    /// Add a field to the schema
    pub fn add_field(mut self, name: &str, field_type: FieldType) -> Self {
        self.fields.push(Field::new(name, field_type));
        self
    }

    pub fn add_number(self, name: &str) -> Self {
        self.add_field(name, FieldType::Number)
    }

    pub fn add_string(self, name: &str) -> Self {
        self.add_field(name, FieldType::String)
    }

    pub fn add_date(self, name: &str) -> Self {
        self.add_field(name, FieldType::Date)
    }

    /// Build the schema
    pub fn build(self) -> Schema {
        Schema::new(self.fields)
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Classifies columns as number, date or string by sampling leading rows
#[derive(Debug, Clone, PartialEq)]
pub struct TypeInferrer {
    sample_size: usize,
    threshold: f64,
}

impl TypeInferrer {
    /// `threshold` is the share of non-missing sampled values that must
    /// coerce for a type to be chosen; it has to be strictly exceeded.
    pub fn new(sample_size: usize, threshold: f64) -> Self {
        TypeInferrer {
            sample_size,
            threshold,
        }
    }

    /// Infer the schema; columns are the first row's keys in order
    pub fn infer(&self, rows: &[Row]) -> Schema {
        let first = match rows.first() {
            Some(row) => row,
            None => return Schema::default(),
        };

        let sample = &rows[..rows.len().min(self.sample_size)];
        let fields = first
            .keys()
            .map(|name| Field::new(name, self.infer_column(sample, name)))
            .collect();

        Schema::new(fields)
    }

    /// Infer the type of a single column
    pub fn infer_column(&self, sample: &[Row], name: &str) -> FieldType {
        let present: Vec<&Value> = sample
            .iter()
            .map(|row| row.value(name))
            .filter(|v| !v.is_missing())
            .collect();

        if present.is_empty() {
            return FieldType::String;
        }

        let total = present.len() as f64;
        let numeric = present.iter().filter(|v| v.as_number().is_some()).count() as f64;
        let dates = present
            .iter()
            .filter(|v| coerce::looks_like_date(v))
            .count() as f64;

        let field_type = if numeric / total > self.threshold {
            FieldType::Number
        } else if dates / total > self.threshold {
            FieldType::Date
        } else {
            FieldType::String
        };

        debug!(
            "Inferred '{}' as {} (numeric {}/{}, dates {}/{})",
            name, field_type, numeric, total, dates, total
        );
        field_type
    }
}

impl Default for TypeInferrer {
    fn default() -> Self {
        TypeInferrer::new(100, 0.8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows_of(name: &str, values: &[&str]) -> Vec<Row> {
        values.iter().map(|v| Row::new().with(name, *v)).collect()
    }

    #[test]
    fn test_infer_number_date_string() {
        let inferrer = TypeInferrer::default();
        assert_eq!(
            inferrer.infer_column(&rows_of("x", &["1", "2.5", "-3"]), "x"),
            FieldType::Number
        );
        assert_eq!(
            inferrer.infer_column(&rows_of("x", &["2024-01-01", "03/04/2023"]), "x"),
            FieldType::Date
        );
        assert_eq!(
            inferrer.infer_column(&rows_of("x", &["a", "1", "2"]), "x"),
            FieldType::String
        );
    }

    #[test]
    fn test_threshold_is_strict() {
        // 4 of 5 numeric is exactly 0.8, which is not enough
        let rows = rows_of("x", &["1", "2", "3", "4", "five"]);
        assert_eq!(
            TypeInferrer::default().infer_column(&rows, "x"),
            FieldType::String
        );

        let rows = rows_of("x", &["1", "2", "3", "4", "5", "6", "7", "8", "9", "ten"]);
        assert_eq!(
            TypeInferrer::default().infer_column(&rows, "x"),
            FieldType::Number
        );
    }

    #[test]
    fn test_missing_values_are_ignored() {
        let rows = rows_of("x", &["", "", "7"]);
        assert_eq!(
            TypeInferrer::default().infer_column(&rows, "x"),
            FieldType::Number
        );

        let rows = rows_of("x", &["", ""]);
        assert_eq!(
            TypeInferrer::default().infer_column(&rows, "x"),
            FieldType::String
        );
    }

    #[test]
    fn test_infer_uses_first_row_keys_and_sample() {
        let mut rows = vec![Row::new().with("b", "x").with("a", "1")];
        rows.push(Row::new().with("a", "2").with("c", "extra"));
        for _ in 0..10 {
            rows.push(Row::new().with("b", "y").with("a", "oops"));
        }

        let schema = TypeInferrer::new(2, 0.8).infer(&rows);
        assert_eq!(schema.names().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(schema.field_type("a"), Some(FieldType::Number));
        assert_eq!(schema.field_type("c"), None);

        assert!(TypeInferrer::default().infer(&[]).is_empty());
    }

    #[test]
    fn test_compare_strategies() {
        let number = FieldType::Number;
        assert_eq!(
            number.compare(&Value::text("10"), &Value::text("9")),
            Ordering::Greater
        );
        assert_eq!(
            number.compare(&Value::text("abc"), &Value::text("9")),
            Ordering::Greater
        );

        let date = FieldType::Date;
        assert_eq!(
            date.compare(&Value::text("01/02/2024"), &Value::text("2023-12-31")),
            Ordering::Greater
        );

        let text = FieldType::String;
        assert_eq!(
            text.compare(&Value::text("apple"), &Value::text("Banana")),
            Ordering::Less
        );
        assert_eq!(
            text.compare(&Value::text("a"), &Value::text("A")),
            Ordering::Less
        );
    }

    #[test]
    fn test_canonicalize() {
        assert_eq!(
            FieldType::Number.canonicalize(&Value::text(" 42 ")),
            Value::Number(42.0)
        );
        assert_eq!(
            FieldType::Number.canonicalize(&Value::text("n/a")),
            Value::Number(0.0)
        );
        assert_eq!(
            FieldType::String.canonicalize(&Value::text("  hi ")),
            Value::text("hi")
        );
        assert_eq!(
            FieldType::String.canonicalize(&Value::Number(3.0)),
            Value::text("3")
        );
        assert_eq!(
            FieldType::Date.canonicalize(&Value::text("02/03/2024")),
            Value::Date(chrono::NaiveDate::from_ymd_opt(2024, 2, 3).unwrap())
        );
        assert_eq!(
            FieldType::Date.canonicalize(&Value::text("soon")),
            Value::Missing
        );
        assert_eq!(FieldType::Date.canonicalize(&Value::Missing), Value::Missing);
    }
}
