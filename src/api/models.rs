// API request and response models
// Author: Gabriel Demetrios Lafis

use serde::{Deserialize, Serialize};

use crate::data::{Field, FileFormat, Row};
use crate::processing::{AggregateOp, FilterCondition, SampleMethod, SortCondition};

/// Upload of a CSV or JSON document
#[derive(Debug, Clone, Deserialize)]
pub struct UploadRequest {
    pub name: String,
    pub format: FileFormat,
    pub content: String,
}

/// Sampling step of a query
#[derive(Debug, Clone, Deserialize)]
pub struct SampleRequest {
    pub size: usize,
    #[serde(default)]
    pub method: SampleMethod,
    pub seed: Option<u64>,
}

/// Filter, then sort, then sample, then clean; export when `format` is set
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub filters: Vec<FilterCondition>,
    #[serde(default)]
    pub sort: Vec<SortCondition>,
    pub sample: Option<SampleRequest>,
    #[serde(default)]
    pub clean: bool,
    pub format: Option<FileFormat>,
}

/// Request to aggregate a dataset
#[derive(Debug, Clone, Deserialize)]
pub struct AggregateRequest {
    pub group_field: String,
    pub value_field: String,
    pub op: AggregateOp,
}

/// Request for group sizes
#[derive(Debug, Clone, Deserialize)]
pub struct GroupsRequest {
    pub field: String,
}

/// Dataset description returned after upload
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub name: String,
    pub rows: usize,
    pub fields: Vec<Field>,
}

/// Rows returned by a query without an export format
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub count: usize,
    pub rows: Vec<Row>,
}
