// Dataset-level entry point over the processing operations
// Author: Gabriel Demetrios Lafis

use std::sync::Arc;

use rand::Rng;

use crate::data::{export_rows, DataError, DataSet, FileFormat, Row, Schema, Value};
use super::{
    aggregate_rows, clean_rows, dataset_stats, filter_rows, group_rows, numeric_stats,
    sample_rows, sort_rows, unique_values, AggregateOp, DatasetStats, FilterCondition, GroupMap,
    NumericStats, SampleMethod, SortCondition,
};

/// Read and transform operations over one immutable dataset.
///
/// Nothing here mutates the dataset; every transformation returns new rows,
/// so a processor can be shared across threads.
#[derive(Debug, Clone)]
pub struct DatasetProcessor {
    dataset: Arc<DataSet>,
}

impl DatasetProcessor {
    pub fn new<D: Into<Arc<DataSet>>>(dataset: D) -> Self {
        DatasetProcessor {
            dataset: dataset.into(),
        }
    }

    pub fn dataset(&self) -> &DataSet {
        &self.dataset
    }

    pub fn rows(&self) -> &[Row] {
        &self.dataset.rows
    }

    pub fn schema(&self) -> &Schema {
        &self.dataset.schema
    }

    pub fn stats(&self) -> DatasetStats {
        dataset_stats(&self.dataset)
    }

    pub fn unique_values(&self, field: &str) -> Vec<Value> {
        unique_values(&self.dataset.rows, field)
    }

    /// `None` when the field is not numeric or has no parsable value
    pub fn numeric_stats(&self, field: &str) -> Option<NumericStats> {
        numeric_stats(&self.dataset, field)
    }

    /// Rows of the base dataset passing every condition
    pub fn filter(&self, conditions: &[FilterCondition]) -> Vec<Row> {
        filter_rows(&self.dataset.rows, conditions)
    }

    /// Sort a working view using this dataset's field types
    pub fn sort(&self, rows: &[Row], conditions: &[SortCondition]) -> Vec<Row> {
        sort_rows(rows, &self.dataset.schema, conditions)
    }

    pub fn group_by(&self, field: &str) -> GroupMap<Vec<Row>> {
        group_rows(&self.dataset.rows, field)
    }

    pub fn aggregate(&self, group_field: &str, value_field: &str, op: AggregateOp) -> GroupMap<f64> {
        aggregate_rows(&self.dataset.rows, group_field, value_field, op)
    }

    /// Sample with the thread-local generator
    pub fn sample(&self, size: usize, method: SampleMethod) -> Vec<Row> {
        self.sample_with_rng(size, method, &mut rand::thread_rng())
    }

    pub fn sample_with_rng<R: Rng + ?Sized>(
        &self,
        size: usize,
        method: SampleMethod,
        rng: &mut R,
    ) -> Vec<Row> {
        sample_rows(&self.dataset.rows, size, method, rng)
    }

    pub fn clean(&self) -> Vec<Row> {
        clean_rows(&self.dataset.rows, &self.dataset.schema)
    }

    /// Clean an arbitrary working view against this dataset's schema
    pub fn clean_rows(&self, rows: &[Row]) -> Vec<Row> {
        clean_rows(rows, &self.dataset.schema)
    }

    pub fn export(&self, rows: &[Row], format: FileFormat) -> Result<String, DataError> {
        export_rows(rows, format)
    }
}
