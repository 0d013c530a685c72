// Tabular Data Engine
// Author: Gabriel Demetrios Lafis

//! # Tabular Data Engine
//!
//! Loads loosely typed tabular data from CSV or JSON, infers a per-column
//! type, and answers queries over it.
//!
//! ## Features
//!
//! - CSV and JSON ingestion with per-column type inference
//! - Type-aware filtering, multi-key sorting and cleaning
//! - Grouping, aggregation and summary statistics
//! - First, last and seeded random sampling
//! - CSV and JSON export
//! - REST API for remote access
//!
//! ## Example
//!
//! ```rust
//! use tabular_data_engine::{
//!     data::{parse_csv, DataSet, FileFormat, IngestOptions},
//!     processing::{DatasetProcessor, FilterCondition, SortCondition},
//! };
//!
//! let rows = parse_csv("name,score\nAnn,7\nBob,12\nCid,3").unwrap();
//! let dataset = DataSet::from_rows(rows, &IngestOptions::default());
//! let processor = DatasetProcessor::new(dataset);
//!
//! let view = processor.filter(&[FilterCondition::greater("score", 5.0)]);
//! let view = processor.sort(&view, &[SortCondition::desc("score")]);
//!
//! let csv = processor.export(&view, FileFormat::Csv).unwrap();
//! assert_eq!(csv, "name,score\nBob,12\nAnn,7");
//! ```

pub mod api;
pub mod data;
pub mod processing;
pub mod storage;
pub mod utils;

// Re-export main types
pub use api::Server;
pub use data::{DataSet, Field, FieldType, FileFormat, Row, Schema, Value};
pub use processing::{DatasetProcessor, Pipeline};
pub use storage::MemoryStorage;
pub use utils::Config;
