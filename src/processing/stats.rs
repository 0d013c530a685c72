// Statistical operations for data processing
// Author: Gabriel Demetrios Lafis

use std::collections::HashSet;

use serde::Serialize;

use crate::data::{DataSet, FieldType, Row, Value};

/// Dataset-wide counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetStats {
    pub total_rows: usize,
    pub total_columns: usize,
    pub numeric_fields: usize,
    pub text_fields: usize,
    pub date_fields: usize,
    /// Missing cells over every (row, declared field) pair
    pub missing_values: usize,
}

/// Summary of a numeric field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub median: f64,
}

impl NumericStats {
    /// Summarize values; `None` when there are none
    pub fn from_values(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let len = values.len();
        let mid = len / 2;
        let median = if len % 2 == 0 {
            (values[mid - 1] + values[mid]) / 2.0
        } else {
            values[mid]
        };

        Some(NumericStats {
            min: values[0],
            max: values[len - 1],
            avg: values.iter().sum::<f64>() / len as f64,
            median,
        })
    }
}

/// Compute dataset-wide counts
pub fn dataset_stats(dataset: &DataSet) -> DatasetStats {
    let schema = &dataset.schema;

    let missing_values = dataset
        .rows
        .iter()
        .map(|row| {
            schema
                .names()
                .filter(|name| row.value(name).is_missing())
                .count()
        })
        .sum();

    DatasetStats {
        total_rows: dataset.len(),
        total_columns: schema.len(),
        numeric_fields: schema.count_of(FieldType::Number),
        text_fields: schema.count_of(FieldType::String),
        date_fields: schema.count_of(FieldType::Date),
        missing_values,
    }
}

/// Distinct non-missing values of a field, in first-appearance order.
///
/// Values of different kinds stay distinct, so text `"5"` and number `5`
/// are both kept.
pub fn unique_values(rows: &[Row], field: &str) -> Vec<Value> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();

    for row in rows {
        let value = row.value(field);
        if value.is_missing() {
            continue;
        }
        if seen.insert(identity(value)) {
            unique.push(value.clone());
        }
    }

    unique
}

// Hashable identity of a value: kind tag plus string form
fn identity(value: &Value) -> (u8, String) {
    let tag = match value {
        Value::Missing => 0,
        Value::Boolean(_) => 1,
        Value::Number(_) => 2,
        Value::Text(_) => 3,
        Value::Date(_) => 4,
    };
    (tag, value.to_string())
}

/// Numeric summary of a field declared as a number.
///
/// Cells that do not parse are dropped. `None` when the field is unknown,
/// not numeric, or has no parsable cell.
pub fn numeric_stats(dataset: &DataSet, field: &str) -> Option<NumericStats> {
    if dataset.schema.field_type(field) != Some(FieldType::Number) {
        return None;
    }

    let values = dataset
        .rows
        .iter()
        .filter_map(|row| row.value(field).as_number())
        .collect();

    NumericStats::from_values(values)
}
