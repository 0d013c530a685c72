// Export of row sets to text
// Author: Gabriel Demetrios Lafis

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{to_csv_string, to_json_string, DataError, Row};

/// Text format used for ingestion and export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    Json,
}

impl FileFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Json => "json",
        }
    }

    /// MIME type of exported text
    pub fn content_type(&self) -> &'static str {
        match self {
            FileFormat::Csv => "text/csv",
            FileFormat::Json => "application/json",
        }
    }

    /// Detect the format from a file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                DataError::NotSupported(format!("No file extension on '{}'", path.display()))
            })?;
        ext.parse()
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for FileFormat {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(FileFormat::Csv),
            "json" => Ok(FileFormat::Json),
            _ => Err(DataError::NotSupported(format!("Unknown file format: {}", s))),
        }
    }
}

/// Render rows as CSV or indented JSON text
pub fn export_rows(rows: &[Row], format: FileFormat) -> Result<String, DataError> {
    debug!("Exporting {} rows as {}", rows.len(), format);
    match format {
        FileFormat::Csv => to_csv_string(rows),
        FileFormat::Json => to_json_string(rows),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_path("data/sales.CSV").unwrap(), FileFormat::Csv);
        assert_eq!(FileFormat::from_path("x.json").unwrap(), FileFormat::Json);
        assert!(FileFormat::from_path("x.parquet").is_err());
        assert!(FileFormat::from_path("noext").is_err());
    }

    #[test]
    fn test_export_rows() {
        let rows = vec![Row::new().with("x", "a,b")];
        assert_eq!(export_rows(&rows, FileFormat::Csv).unwrap(), "x\n\"a,b\"");
        assert_eq!(export_rows(&[], FileFormat::Csv).unwrap(), "");
        assert_eq!(export_rows(&[], FileFormat::Json).unwrap(), "[]");
    }
}
