// JSON data source and writer implementation
// Author: Gabriel Demetrios Lafis

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde_json::Value as JsonValue;

use super::{DataError, DataSet, DataSource, IngestOptions, Row, SourceType};

/// JSON data source; the document root must be an array of objects
pub struct JsonSource {
    path: String,
    options: IngestOptions,
}

impl JsonSource {
    /// Create a new JSON data source
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        JsonSource {
            path: path.as_ref().to_string_lossy().to_string(),
            options: IngestOptions::default(),
        }
    }

    pub fn with_options(mut self, options: IngestOptions) -> Self {
        self.options = options;
        self
    }
}

impl DataSource for JsonSource {
    fn read(&self) -> Result<DataSet, DataError> {
        let file = File::open(&self.path)?;
        let rows = read_json_rows(BufReader::new(file))?;

        let mut dataset = DataSet::from_rows(rows, &self.options);
        dataset.metadata.add("source".to_string(), "json".to_string());
        dataset.metadata.add("path".to_string(), self.path.clone());

        Ok(dataset)
    }

    fn name(&self) -> &str {
        &self.path
    }

    fn source_type(&self) -> SourceType {
        SourceType::File
    }
}

/// Read a JSON array of objects into rows, keeping each object's key order
pub fn read_json_rows<R: Read>(reader: R) -> Result<Vec<Row>, DataError> {
    let json: JsonValue =
        serde_json::from_reader(reader).map_err(|e| DataError::ParseError(e.to_string()))?;
    json_to_rows(&json)
}

/// Parse JSON text into rows
pub fn parse_json(text: &str) -> Result<Vec<Row>, DataError> {
    read_json_rows(text.as_bytes())
}

fn json_to_rows(json: &JsonValue) -> Result<Vec<Row>, DataError> {
    let array = json
        .as_array()
        .ok_or_else(|| DataError::ParseError("JSON root is not an array".to_string()))?;

    array
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_object().map(Row::from_json_object).ok_or_else(|| {
                DataError::ParseError(format!("Array element {} is not an object", i))
            })
        })
        .collect()
}

/// Render rows as indented JSON
pub fn to_json_string(rows: &[Row]) -> Result<String, DataError> {
    serde_json::to_string_pretty(rows).map_err(|e| DataError::ParseError(e.to_string()))
}
