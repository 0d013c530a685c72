// Storage module for datasets held during a session
// Author: Gabriel Demetrios Lafis

mod memory;

pub use memory::*;

use std::sync::Arc;

use thiserror::Error;

use crate::data::DataSet;

/// Named dataset store shared by request handlers
pub trait DataStorage {
    /// Store a new dataset; fails if the name is taken
    fn store(&self, name: &str, data: DataSet) -> Result<Arc<DataSet>, StorageError>;

    /// Load a dataset
    fn load(&self, name: &str) -> Result<Arc<DataSet>, StorageError>;

    /// Check if a dataset exists
    fn exists(&self, name: &str) -> Result<bool, StorageError>;

    /// Delete a dataset
    fn delete(&self, name: &str) -> Result<(), StorageError>;

    /// List all dataset names, sorted
    fn list(&self) -> Result<Vec<String>, StorageError>;
}

/// Represents an error in the storage module
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Dataset '{0}' not found")]
    NotFound(String),
    #[error("Dataset '{0}' already exists")]
    AlreadyExists(String),
    #[error("Error: {0}")]
    Other(String),
}
