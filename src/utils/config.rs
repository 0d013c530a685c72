// Configuration utilities
// Author: Gabriel Demetrios Lafis

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::{IngestOptions, TypeInferrer};
use super::{validate_range, AppError};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub ingestion: IngestionConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    pub enable_cors: bool,
}

/// Ingestion limits and type inference tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    pub max_rows: usize,
    pub inference_sample_size: usize,
    pub type_threshold: f64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            workers: None,
            enable_cors: false,
        }
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        IngestionConfig {
            max_rows: 1000,
            inference_sample_size: 100,
            type_threshold: 0.8,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
        }
    }
}

impl IngestionConfig {
    /// Options handed to the CSV/JSON readers
    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            max_rows: self.max_rows,
            inferrer: TypeInferrer::new(self.inference_sample_size, self.type_threshold),
        }
    }
}

impl ServerConfig {
    /// Worker count, defaulting to the number of CPUs
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get)
    }
}

impl Config {
    /// Load configuration from a `.json`, `.yaml` or `.yml` file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());

        let config: Config = match extension.as_deref() {
            Some("json") => {
                serde_json::from_str(&contents).map_err(|e| AppError::Config(e.to_string()))?
            }
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(&contents).map_err(|e| AppError::Config(e.to_string()))?
            }
            _ => {
                return Err(AppError::Config(format!(
                    "Unsupported config file format: {}",
                    path.display()
                )))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Check ingestion settings are usable
    pub fn validate(&self) -> Result<(), AppError> {
        let ingestion = &self.ingestion;
        validate_range(ingestion.type_threshold, 0.0, 1.0, "ingestion.type_threshold")
            .and_then(|_| {
                validate_range(ingestion.max_rows, 1, usize::MAX, "ingestion.max_rows")
            })
            .and_then(|_| {
                validate_range(
                    ingestion.inference_sample_size,
                    1,
                    usize::MAX,
                    "ingestion.inference_sample_size",
                )
            })
            .map_err(AppError::Config)
    }

    /// Get the log level filter
    pub fn log_level_filter(&self) -> log::LevelFilter {
        match self.logging.level.to_lowercase().as_str() {
            "off" => log::LevelFilter::Off,
            "error" => log::LevelFilter::Error,
            "warn" => log::LevelFilter::Warn,
            "info" => log::LevelFilter::Info,
            "debug" => log::LevelFilter::Debug,
            "trace" => log::LevelFilter::Trace,
            _ => log::LevelFilter::Info,
        }
    }
}
