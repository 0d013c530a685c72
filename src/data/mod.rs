// Data module for handling data structures and formats
// Author: Gabriel Demetrios Lafis

pub mod coerce;
mod csv;
mod export;
mod json;
mod schema;

pub use self::csv::*;
pub use export::*;
pub use json::*;
pub use schema::*;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, warn};
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Represents a generic data source
pub trait DataSource {
    /// Read data from the source
    fn read(&self) -> Result<DataSet, DataError>;

    /// Get the source name
    fn name(&self) -> &str;

    /// Get the source type
    fn source_type(&self) -> SourceType;
}

/// Represents a source type
#[derive(Debug, Clone, PartialEq)]
pub enum SourceType {
    File,
}

/// Options applied when raw rows become a dataset
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Rows beyond this count are dropped at ingestion
    pub max_rows: usize,
    pub inferrer: TypeInferrer,
}

impl Default for IngestOptions {
    fn default() -> Self {
        IngestOptions {
            max_rows: 1000,
            inferrer: TypeInferrer::default(),
        }
    }
}

/// Represents a dataset with schema and rows
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    pub schema: Schema,
    pub rows: Vec<Row>,
    pub metadata: Metadata,
}

impl DataSet {
    /// Create a new empty dataset
    pub fn new(schema: Schema) -> Self {
        DataSet {
            schema,
            rows: Vec::new(),
            metadata: Metadata::new(),
        }
    }

    /// Create a dataset from rows with an already known schema
    pub fn with_rows(schema: Schema, rows: Vec<Row>) -> Self {
        DataSet {
            schema,
            rows,
            metadata: Metadata::new(),
        }
    }

    /// Build a dataset from raw rows: cap the row count, then infer field types
    pub fn from_rows(mut rows: Vec<Row>, options: &IngestOptions) -> Self {
        if rows.len() > options.max_rows {
            warn!(
                "Input has {} rows, keeping the first {}",
                rows.len(),
                options.max_rows
            );
            rows.truncate(options.max_rows);
        }

        let schema = options.inferrer.infer(&rows);
        debug!(
            "Ingested {} rows with {} fields",
            rows.len(),
            schema.fields.len()
        );

        DataSet::with_rows(schema, rows)
    }

    /// Get the number of rows in the dataset
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Derive a dataset sharing this schema and metadata but holding other rows
    pub fn derive(&self, rows: Vec<Row>) -> DataSet {
        DataSet {
            schema: self.schema.clone(),
            rows,
            metadata: self.metadata.clone(),
        }
    }
}

/// Parse CSV or JSON text into a dataset
pub fn parse_dataset(
    text: &str,
    format: FileFormat,
    options: &IngestOptions,
) -> Result<DataSet, DataError> {
    let rows = match format {
        FileFormat::Csv => parse_csv(text)?,
        FileFormat::Json => parse_json(text)?,
    };

    let mut dataset = DataSet::from_rows(rows, options);
    dataset.metadata.add("source".to_string(), format.extension().to_string());
    Ok(dataset)
}

/// Load a dataset from a file, picking the reader from the file extension
pub fn load_dataset<P: AsRef<Path>>(path: P, options: &IngestOptions) -> Result<DataSet, DataError> {
    let path = path.as_ref();
    match FileFormat::from_path(path)? {
        FileFormat::Csv => CsvSource::new(path).with_options(options.clone()).read(),
        FileFormat::Json => JsonSource::new(path).with_options(options.clone()).read(),
    }
}

/// A single cell value
///
/// Absent keys, JSON `null` and empty text are all treated as missing; see
/// [`Value::is_missing`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Missing,
    Boolean(bool),
    Number(f64),
    Text(String),
    Date(NaiveDate),
}

static MISSING: Value = Value::Missing;

impl Value {
    /// Create a text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        Value::Text(s.into())
    }

    /// Whether the cell counts as missing
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Numeric coercion; `None` stands for NaN
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) if !n.is_nan() => Some(*n),
            Value::Text(s) => coerce::parse_number(s),
            _ => None,
        }
    }

    /// Date coercion to a timestamp
    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Date(d) => d.and_hms_opt(0, 0, 0),
            Value::Text(s) => coerce::parse_date(s),
            _ => None,
        }
    }

    /// Borrow the text of a `Text` value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert a parsed JSON value into a cell
    pub fn from_json(json: &JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Missing,
            JsonValue::Bool(b) => Value::Boolean(*b),
            JsonValue::Number(n) => n.as_f64().map_or(Value::Missing, Value::Number),
            JsonValue::String(s) => Value::Text(s.clone()),
            // Nested structures are kept as their JSON text
            JsonValue::Array(_) | JsonValue::Object(_) => Value::Text(json.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Missing => Ok(()),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", coerce::format_number(*n)),
            Value::Text(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

// Largest integer a double represents exactly
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Missing => serializer.serialize_none(),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Number(n) if !n.is_finite() => serializer.serialize_none(),
            Value::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER => {
                serializer.serialize_i64(*n as i64)
            }
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Date(d) => serializer.collect_str(&d.format("%Y-%m-%d")),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = JsonValue::deserialize(deserializer)?;
        Ok(Value::from_json(&json))
    }
}

/// A row: an insertion-ordered mapping from field name to cell
///
/// Rows may be sparse; looking up an absent key yields [`Value::Missing`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, Value)>,
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Row { cells: Vec::new() }
    }

    /// Create a row from `(name, value)` pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut row = Row::new();
        for (name, value) in pairs {
            row.insert(name, value);
        }
        row
    }

    /// Convert a JSON object into a row, keeping its key order
    pub fn from_json_object(object: &serde_json::Map<String, JsonValue>) -> Self {
        Row {
            cells: object
                .iter()
                .map(|(k, v)| (k.clone(), Value::from_json(v)))
                .collect(),
        }
    }

    /// Get the value stored under a key, if the key is present
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.cells.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Get a cell, treating an absent key as missing
    pub fn value(&self, name: &str) -> &Value {
        self.get(name).unwrap_or(&MISSING)
    }

    /// Set a cell, replacing in place when the key already exists
    pub fn insert<K: Into<String>, V: Into<Value>>(&mut self, name: K, value: V) {
        let name = name.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.cells.push((name, value)),
        }
    }

    /// Builder form of [`Row::insert`]
    pub fn with<K: Into<String>, V: Into<Value>>(mut self, name: K, value: V) -> Self {
        self.insert(name, value);
        self
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (name, value) in &self.cells {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Represents metadata for a dataset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub properties: HashMap<String, String>,
}

impl Metadata {
    /// Create new empty metadata
    pub fn new() -> Self {
        Metadata {
            properties: HashMap::new(),
        }
    }

    /// Add a property to the metadata
    pub fn add(&mut self, key: String, value: String) {
        self.properties.insert(key, value);
    }

    /// Get a property from the metadata
    pub fn get(&self, key: &str) -> Option<&String> {
        self.properties.get(key)
    }
}

/// Represents an error in the data module
#[derive(Debug, Error)]
pub enum DataError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] ::csv::Error),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Not supported: {0}")]
    NotSupported(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_definition() {
        assert!(Value::Missing.is_missing());
        assert!(Value::text("").is_missing());
        assert!(!Value::text(" ").is_missing());
        assert!(!Value::Number(0.0).is_missing());
        assert!(!Value::Boolean(false).is_missing());

        let row = Row::new().with("a", "x");
        assert!(row.value("b").is_missing());
        assert!(row.get("b").is_none());
    }

    #[test]
    fn test_row_insert_keeps_order() {
        let mut row = Row::from_pairs(vec![("b", "1"), ("a", "2")]);
        row.insert("b", 3.0);
        row.insert("c", true);

        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(row.value("b"), &Value::Number(3.0));
        assert_eq!(row.len(), 3);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Number(5.0).to_string(), "5");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Missing.to_string(), "");
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(Value::Date(date).to_string(), "2024-03-09");
    }

    #[test]
    fn test_value_serialization() {
        let row = Row::new()
            .with("n", 5.0)
            .with("f", 2.5)
            .with("m", Value::Missing)
            .with("d", NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"n":5,"f":2.5,"m":null,"d":"2024-01-02"}"#);
    }

    #[test]
    fn test_value_from_json() {
        let value: Value = serde_json::from_str("12").unwrap();
        assert_eq!(value, Value::Number(12.0));
        let value: Value = serde_json::from_str("null").unwrap();
        assert_eq!(value, Value::Missing);
        let value: Value = serde_json::from_str("[1,2]").unwrap();
        assert_eq!(value, Value::text("[1,2]"));
    }

    #[test]
    fn test_from_rows_truncates() {
        let rows: Vec<Row> = (0..20).map(|i| Row::new().with("i", i as f64)).collect();
        let options = IngestOptions {
            max_rows: 5,
            ..IngestOptions::default()
        };
        let dataset = DataSet::from_rows(rows, &options);

        assert_eq!(dataset.len(), 5);
        assert_eq!(dataset.schema.field_type("i"), Some(FieldType::Number));
    }
}
