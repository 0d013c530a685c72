// Aggregate operations for data processing
// Author: Gabriel Demetrios Lafis

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;

use crate::data::{DataSet, Field, FieldType, Row, Schema, Value};
use super::{DataProcessor, ProcessingError, ProcessorType};

/// Key used for rows whose grouping cell is missing
pub const UNKNOWN_GROUP: &str = "Unknown";

/// Map from group key to a value, iterating in first-appearance order
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMap<T> {
    entries: Vec<(String, T)>,
    index: HashMap<String, usize>,
}

impl<T> GroupMap<T> {
    pub fn new() -> Self {
        GroupMap {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// Get the value for `key`, inserting `default()` on first sight
    pub fn entry_or_insert_with<F: FnOnce() -> T>(&mut self, key: &str, default: F) -> &mut T {
        let position = match self.index.get(key) {
            Some(&i) => i,
            None => {
                self.entries.push((key.to_string(), default()));
                self.index.insert(key.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[position].1
    }

    /// Insert or replace a value
    pub fn insert(&mut self, key: String, value: T) {
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for GroupMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IntoIterator for GroupMap<T> {
    type Item = (String, T);
    type IntoIter = std::vec::IntoIter<(String, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<T> FromIterator<(String, T)> for GroupMap<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        let mut map = GroupMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

// Results go out as cells so whole numbers print the way rows print them
impl<T: Clone + Into<Value>> Serialize for GroupMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            let cell: Value = value.clone().into();
            map.serialize_entry(key, &cell)?;
        }
        map.end()
    }
}

/// Reduction applied to the value field of each group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateOp {
    /// Unparsable cells count as 0
    Sum,
    /// Mean of parsable cells only; 0 when none parse
    Avg,
    /// Rows in the group; the value field is not read
    Count,
    /// 0 when no cell parses, which cannot be told apart from a real 0
    Min,
    /// 0 when no cell parses, which cannot be told apart from a real 0
    Max,
}

impl AggregateOp {
    pub fn name(&self) -> &'static str {
        match self {
            AggregateOp::Sum => "sum",
            AggregateOp::Avg => "avg",
            AggregateOp::Count => "count",
            AggregateOp::Min => "min",
            AggregateOp::Max => "max",
        }
    }

    /// Reduce the value field over one group's rows
    pub fn apply(&self, rows: &[Row], value_field: &str) -> f64 {
        match self {
            AggregateOp::Count => rows.len() as f64,
            AggregateOp::Sum => rows
                .iter()
                .map(|r| r.value(value_field).as_number().unwrap_or(0.0))
                .sum(),
            AggregateOp::Avg => {
                let values: Vec<f64> = parsed_values(rows, value_field).collect();
                if values.is_empty() {
                    0.0
                } else {
                    values.iter().sum::<f64>() / values.len() as f64
                }
            }
            AggregateOp::Min => parsed_values(rows, value_field)
                .reduce(f64::min)
                .unwrap_or(0.0),
            AggregateOp::Max => parsed_values(rows, value_field)
                .reduce(f64::max)
                .unwrap_or(0.0),
        }
    }
}

fn parsed_values<'a>(rows: &'a [Row], field: &'a str) -> impl Iterator<Item = f64> + 'a {
    rows.iter().filter_map(move |r| r.value(field).as_number())
}

impl fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AggregateOp {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sum" => Ok(AggregateOp::Sum),
            "avg" => Ok(AggregateOp::Avg),
            "count" => Ok(AggregateOp::Count),
            "min" => Ok(AggregateOp::Min),
            "max" => Ok(AggregateOp::Max),
            _ => Err(ProcessingError::InvalidArgument(format!(
                "Unknown aggregation: {}",
                s
            ))),
        }
    }
}

/// Group key of a cell: its string form, or `"Unknown"` when missing
pub fn group_key(value: &Value) -> String {
    if value.is_missing() {
        UNKNOWN_GROUP.to_string()
    } else {
        value.to_string()
    }
}

/// Partition rows by the string form of a field; every row lands in one group
pub fn group_rows(rows: &[Row], field: &str) -> GroupMap<Vec<Row>> {
    let mut groups = GroupMap::new();
    for row in rows {
        groups
            .entry_or_insert_with(&group_key(row.value(field)), Vec::new)
            .push(row.clone());
    }

    debug!("Grouped {} rows by '{}' into {} groups", rows.len(), field, groups.len());
    groups
}

/// Group rows and reduce the value field of each group
pub fn aggregate_rows(
    rows: &[Row],
    group_field: &str,
    value_field: &str,
    op: AggregateOp,
) -> GroupMap<f64> {
    group_rows(rows, group_field)
        .into_iter()
        .map(|(key, members)| {
            let result = op.apply(&members, value_field);
            (key, result)
        })
        .collect()
}

/// Aggregates a dataset into a two-column dataset of group key and result
pub struct AggregateProcessor {
    group_field: String,
    value_field: String,
    op: AggregateOp,
}

impl AggregateProcessor {
    pub fn new(group_field: &str, value_field: &str, op: AggregateOp) -> Self {
        AggregateProcessor {
            group_field: group_field.to_string(),
            value_field: value_field.to_string(),
            op,
        }
    }

    pub fn count(group_field: &str) -> Self {
        Self::new(group_field, group_field, AggregateOp::Count)
    }

    /// Name of the result column, e.g. `sum_amount`
    pub fn output_field(&self) -> String {
        format!("{}_{}", self.op.name(), self.value_field)
    }
}

impl DataProcessor for AggregateProcessor {
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        if input.schema.get_field_by_name(&self.group_field).is_none() {
            return Err(ProcessingError::InvalidArgument(format!(
                "Group by column '{}' not found",
                self.group_field
            )));
        }

        let output_field = self.output_field();
        let schema = Schema::new(vec![
            Field::new(self.group_field.clone(), FieldType::String),
            Field::new(output_field.clone(), FieldType::Number),
        ]);

        let rows = aggregate_rows(&input.rows, &self.group_field, &self.value_field, self.op)
            .into_iter()
            .map(|(key, result)| {
                Row::new()
                    .with(self.group_field.as_str(), key)
                    .with(output_field.as_str(), result)
            })
            .collect();

        let mut result = DataSet::with_rows(schema, rows);
        result.metadata = input.metadata.clone();
        Ok(result)
    }

    fn name(&self) -> &str {
        "aggregate"
    }

    fn processor_type(&self) -> ProcessorType {
        ProcessorType::Aggregate
    }
}
