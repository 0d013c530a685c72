// Filter operations for data processing
// Author: Gabriel Demetrios Lafis

use std::fmt;
use std::str::FromStr;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::data::{coerce, DataSet, Row, Value};
use super::{DataProcessor, ProcessingError, ProcessorType};

/// Comparison applied by a filter condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterOperator {
    /// Loose equality; numbers compare numerically against numeric text
    Equals,
    /// Case-insensitive substring match on string forms
    Contains,
    Greater,
    Less,
    /// Inclusive on both bounds
    Between,
    NotEmpty,
    /// Unrecognised operator name; every row passes
    Unknown(String),
}

impl FilterOperator {
    pub fn as_str(&self) -> &str {
        match self {
            FilterOperator::Equals => "equals",
            FilterOperator::Contains => "contains",
            FilterOperator::Greater => "greater",
            FilterOperator::Less => "less",
            FilterOperator::Between => "between",
            FilterOperator::NotEmpty => "not_empty",
            FilterOperator::Unknown(name) => name,
        }
    }
}

impl From<&str> for FilterOperator {
    fn from(name: &str) -> Self {
        match name {
            "equals" => FilterOperator::Equals,
            "contains" => FilterOperator::Contains,
            "greater" => FilterOperator::Greater,
            "less" => FilterOperator::Less,
            "between" => FilterOperator::Between,
            "not_empty" => FilterOperator::NotEmpty,
            other => FilterOperator::Unknown(other.to_string()),
        }
    }
}

impl From<String> for FilterOperator {
    fn from(name: String) -> Self {
        FilterOperator::from(name.as_str())
    }
}

impl From<FilterOperator> for String {
    fn from(op: FilterOperator) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single predicate on one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub field: String,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: Value,
    /// Upper bound, only read by `between`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value2: Option<Value>,
}

impl FilterCondition {
    pub fn new<F, V>(field: F, operator: FilterOperator, value: V) -> Self
    where
        F: Into<String>,
        V: Into<Value>,
    {
        FilterCondition {
            field: field.into(),
            operator,
            value: value.into(),
            value2: None,
        }
    }

    pub fn equals<V: Into<Value>>(field: &str, value: V) -> Self {
        Self::new(field, FilterOperator::Equals, value)
    }

    pub fn contains(field: &str, needle: &str) -> Self {
        Self::new(field, FilterOperator::Contains, needle)
    }

    pub fn greater<V: Into<Value>>(field: &str, value: V) -> Self {
        Self::new(field, FilterOperator::Greater, value)
    }

    pub fn less<V: Into<Value>>(field: &str, value: V) -> Self {
        Self::new(field, FilterOperator::Less, value)
    }

    pub fn between<V: Into<Value>, W: Into<Value>>(field: &str, low: V, high: W) -> Self {
        let mut condition = Self::new(field, FilterOperator::Between, low);
        condition.value2 = Some(high.into());
        condition
    }

    pub fn not_empty(field: &str) -> Self {
        Self::new(field, FilterOperator::NotEmpty, Value::Missing)
    }

    /// Evaluate the condition against a row.
    ///
    /// Numeric operators coerce both sides; a side that does not coerce
    /// makes the predicate false.
    pub fn matches(&self, row: &Row) -> bool {
        let cell = row.value(&self.field);

        match &self.operator {
            FilterOperator::Equals => coerce::loose_equals(cell, &self.value),
            FilterOperator::Contains => cell
                .to_string()
                .to_lowercase()
                .contains(&self.value.to_string().to_lowercase()),
            FilterOperator::Greater => match (cell.as_number(), self.value.as_number()) {
                (Some(x), Some(bound)) => x > bound,
                _ => false,
            },
            FilterOperator::Less => match (cell.as_number(), self.value.as_number()) {
                (Some(x), Some(bound)) => x < bound,
                _ => false,
            },
            FilterOperator::Between => {
                let high = self.value2.as_ref().and_then(Value::as_number);
                match (cell.as_number(), self.value.as_number(), high) {
                    (Some(x), Some(low), Some(high)) => low <= x && x <= high,
                    _ => false,
                }
            }
            FilterOperator::NotEmpty => !cell.is_missing(),
            FilterOperator::Unknown(_) => true,
        }
    }
}

/// Parse `field:operator[:value[:value2]]`, as typed on the command line.
///
/// Values stay text; the second value is the remainder of the input, so it
/// may contain colons.
impl FromStr for FilterCondition {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(4, ':');
        let field = parts.next().filter(|f| !f.is_empty());
        let operator = parts.next().filter(|o| !o.is_empty());

        let (field, operator) = match (field, operator) {
            (Some(field), Some(operator)) => (field, FilterOperator::from(operator)),
            _ => {
                return Err(ProcessingError::InvalidArgument(format!(
                    "Invalid filter '{}', expected field:operator[:value[:value2]]",
                    s
                )))
            }
        };

        let value = parts.next().map(Value::from).unwrap_or_default();
        let mut condition = FilterCondition::new(field, operator, value);
        condition.value2 = parts.next().map(Value::from);
        Ok(condition)
    }
}

/// Keep rows satisfying every condition
pub fn filter_rows(rows: &[Row], conditions: &[FilterCondition]) -> Vec<Row> {
    for condition in conditions {
        if let FilterOperator::Unknown(name) = &condition.operator {
            warn!(
                "Unknown filter operator '{}' on field '{}', condition ignored",
                name, condition.field
            );
        }
    }

    let kept: Vec<Row> = rows
        .iter()
        .filter(|row| conditions.iter().all(|c| c.matches(row)))
        .cloned()
        .collect();

    debug!(
        "Filter with {} conditions kept {} of {} rows",
        conditions.len(),
        kept.len(),
        rows.len()
    );
    kept
}

/// Filter rows by a conjunction of conditions
pub struct FilterProcessor {
    name: String,
    conditions: Vec<FilterCondition>,
}

impl FilterProcessor {
    /// Create a new filter processor
    pub fn new(conditions: Vec<FilterCondition>) -> Self {
        FilterProcessor {
            name: "filter".to_string(),
            conditions,
        }
    }
}

impl DataProcessor for FilterProcessor {
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        Ok(input.derive(filter_rows(&input.rows, &self.conditions)))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn processor_type(&self) -> ProcessorType {
        ProcessorType::Filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(v: &str) -> Row {
        Row::new().with("v", v)
    }

    #[test]
    fn test_equals_is_loose() {
        let rows = vec![row("5"), row("6"), Row::new().with("v", 5.0)];
        let kept = filter_rows(&rows, &[FilterCondition::equals("v", 5.0)]);
        assert_eq!(kept.len(), 2);

        let kept = filter_rows(&rows, &[FilterCondition::equals("v", "6")]);
        assert_eq!(kept, vec![row("6")]);
    }

    #[test]
    fn test_contains_ignores_case() {
        let rows = vec![row("New York"), row("Boston"), row("york")];
        let kept = filter_rows(&rows, &[FilterCondition::contains("v", "YORK")]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_numeric_comparisons() {
        let rows = vec![row("1"), row("10"), row("abc"), Row::new()];

        let kept = filter_rows(&rows, &[FilterCondition::greater("v", "5")]);
        assert_eq!(kept, vec![row("10")]);

        let kept = filter_rows(&rows, &[FilterCondition::less("v", 5.0)]);
        assert_eq!(kept, vec![row("1")]);

        let kept = filter_rows(&rows, &[FilterCondition::greater("v", "abc")]);
        assert!(kept.is_empty());
    }

    #[test]
    fn test_between_is_inclusive() {
        let rows = vec![row("1"), row("5"), row("10"), row("11")];
        let kept = filter_rows(&rows, &[FilterCondition::between("v", "1", "10")]);
        assert_eq!(kept, vec![row("1"), row("5"), row("10")]);

        // A between without an upper bound matches nothing
        let mut open = FilterCondition::between("v", "1", "10");
        open.value2 = None;
        assert!(filter_rows(&rows, &[open]).is_empty());
    }

    #[test]
    fn test_not_empty() {
        let rows = vec![row("x"), row(""), Row::new().with("v", Value::Missing), Row::new()];
        let kept = filter_rows(&rows, &[FilterCondition::not_empty("v")]);
        assert_eq!(kept, vec![row("x")]);
    }

    #[test]
    fn test_unknown_operator_passes() {
        let rows = vec![row("a"), row("b")];
        let condition = FilterCondition::new("v", FilterOperator::from("regex"), "^a");
        assert_eq!(filter_rows(&rows, &[condition]).len(), 2);
    }

    #[test]
    fn test_conditions_are_conjunctive() {
        let rows = vec![
            Row::new().with("city", "Paris").with("n", "3"),
            Row::new().with("city", "Paris").with("n", "30"),
            Row::new().with("city", "Rome").with("n", "30"),
        ];
        let conditions = vec![
            FilterCondition::equals("city", "Paris"),
            FilterCondition::greater("n", 10.0),
        ];
        let kept = filter_rows(&rows, &conditions);
        assert_eq!(kept, vec![rows[1].clone()]);
        assert_eq!(filter_rows(&rows, &[]).len(), 3);
    }

    #[test]
    fn test_condition_deserialization() {
        let condition: FilterCondition = serde_json::from_str(
            r#"{"field": "v", "operator": "between", "value": "1", "value2": 10}"#,
        )
        .unwrap();
        assert_eq!(condition.operator, FilterOperator::Between);
        assert_eq!(condition.value2, Some(Value::Number(10.0)));

        let condition: FilterCondition =
            serde_json::from_str(r#"{"field": "v", "operator": "fuzzy"}"#).unwrap();
        assert_eq!(condition.operator, FilterOperator::Unknown("fuzzy".to_string()));
        assert_eq!(condition.value, Value::Missing);
    }

    #[test]
    fn test_parse_condition() {
        let condition: FilterCondition = "score:between:1:10".parse().unwrap();
        assert_eq!(condition, FilterCondition::between("score", "1", "10"));

        let condition: FilterCondition = "at:between:08:00:12:30".parse().unwrap();
        assert_eq!(condition.value, Value::text("08"));
        assert_eq!(condition.value2, Some(Value::text("00:12:30")));

        let condition: FilterCondition = "name:not_empty".parse().unwrap();
        assert_eq!(condition, FilterCondition::not_empty("name"));

        assert!("name".parse::<FilterCondition>().is_err());
        assert!(":equals:x".parse::<FilterCondition>().is_err());
    }
}
