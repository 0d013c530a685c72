// Multi-key sort operations
// Author: Gabriel Demetrios Lafis

use std::cmp::Ordering;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::data::{DataSet, FieldType, Row, Schema};
use super::{DataProcessor, ProcessingError, ProcessorType};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(ProcessingError::InvalidArgument(format!(
                "Unknown sort direction: {}",
                s
            ))),
        }
    }
}

/// One key of a lexicographic sort
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortCondition {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortCondition {
    pub fn new(field: &str, direction: SortDirection) -> Self {
        SortCondition {
            field: field.to_string(),
            direction,
        }
    }

    pub fn asc(field: &str) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: &str) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

/// Parse `field[:asc|:desc]`
impl FromStr for SortCondition {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match s.rsplit_once(':') {
            Some((field, direction)) => (field, direction.parse()?),
            None => (s, SortDirection::Asc),
        };

        if field.is_empty() {
            return Err(ProcessingError::InvalidArgument(format!(
                "Invalid sort '{}', expected field[:asc|:desc]",
                s
            )));
        }
        Ok(SortCondition::new(field, direction))
    }
}

// A sort key with its comparison strategy resolved from the schema
struct SortKey<'a> {
    field: &'a str,
    field_type: FieldType,
    direction: SortDirection,
}

impl SortKey<'_> {
    fn compare(&self, a: &Row, b: &Row) -> Ordering {
        let ordering = self
            .field_type
            .compare(a.value(self.field), b.value(self.field));
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Stable multi-key sort returning a new row order.
///
/// Keys are compared in order and the first non-equal comparison decides.
/// Fields absent from the schema compare as strings.
pub fn sort_rows(rows: &[Row], schema: &Schema, conditions: &[SortCondition]) -> Vec<Row> {
    let keys: Vec<SortKey> = conditions
        .iter()
        .map(|c| SortKey {
            field: &c.field,
            field_type: schema.field_type(&c.field).unwrap_or(FieldType::String),
            direction: c.direction,
        })
        .collect();

    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| {
        keys.iter()
            .map(|key| key.compare(a, b))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });

    debug!("Sorted {} rows on {} keys", sorted.len(), keys.len());
    sorted
}

/// Sort a dataset by one or more keys
pub struct SortProcessor {
    conditions: Vec<SortCondition>,
}

impl SortProcessor {
    pub fn new(conditions: Vec<SortCondition>) -> Self {
        SortProcessor { conditions }
    }
}

impl DataProcessor for SortProcessor {
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        Ok(input.derive(sort_rows(&input.rows, &input.schema, &self.conditions)))
    }

    fn name(&self) -> &str {
        "sort"
    }

    fn processor_type(&self) -> ProcessorType {
        ProcessorType::Sort
    }
}
