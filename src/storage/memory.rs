// Memory storage implementation
// Author: Gabriel Demetrios Lafis

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use log::info;

use crate::data::DataSet;
use super::{DataStorage, StorageError};

/// In-process dataset store; datasets are immutable once stored
pub struct MemoryStorage {
    datasets: RwLock<HashMap<String, Arc<DataSet>>>,
}

impl MemoryStorage {
    /// Create a new memory storage
    pub fn new() -> Self {
        MemoryStorage {
            datasets: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> StorageError {
    StorageError::Other("Dataset store lock poisoned".to_string())
}

impl DataStorage for MemoryStorage {
    fn store(&self, name: &str, data: DataSet) -> Result<Arc<DataSet>, StorageError> {
        let mut datasets = self.datasets.write().map_err(poisoned)?;

        if datasets.contains_key(name) {
            return Err(StorageError::AlreadyExists(name.to_string()));
        }

        let data = Arc::new(data);
        info!("Stored dataset '{}' with {} rows", name, data.len());
        datasets.insert(name.to_string(), Arc::clone(&data));
        Ok(data)
    }

    fn load(&self, name: &str) -> Result<Arc<DataSet>, StorageError> {
        let datasets = self.datasets.read().map_err(poisoned)?;

        datasets
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    fn exists(&self, name: &str) -> Result<bool, StorageError> {
        let datasets = self.datasets.read().map_err(poisoned)?;
        Ok(datasets.contains_key(name))
    }

    fn delete(&self, name: &str) -> Result<(), StorageError> {
        let mut datasets = self.datasets.write().map_err(poisoned)?;

        if datasets.remove(name).is_none() {
            return Err(StorageError::NotFound(name.to_string()));
        }

        Ok(())
    }

    fn list(&self) -> Result<Vec<String>, StorageError> {
        let datasets = self.datasets.read().map_err(poisoned)?;

        let mut names: Vec<String> = datasets.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
