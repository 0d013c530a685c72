// CSV data source and writer implementation
// Author: Gabriel Demetrios Lafis

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};

use super::{DataError, DataSet, DataSource, IngestOptions, Row, SourceType, Value};

/// CSV data source; the first record is the header
pub struct CsvSource {
    path: String,
    delimiter: u8,
    options: IngestOptions,
}

impl CsvSource {
    /// Create a new CSV data source
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        CsvSource {
            path: path.as_ref().to_string_lossy().to_string(),
            delimiter: b',',
            options: IngestOptions::default(),
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_options(mut self, options: IngestOptions) -> Self {
        self.options = options;
        self
    }
}

impl DataSource for CsvSource {
    fn read(&self) -> Result<DataSet, DataError> {
        let file = File::open(&self.path)?;
        let rows = read_csv_rows(BufReader::new(file), self.delimiter)?;

        let mut dataset = DataSet::from_rows(rows, &self.options);
        dataset.metadata.add("source".to_string(), "csv".to_string());
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

/// Read header plus records into rows.
///
/// Empty cells become missing. Short records produce sparse rows and cells
/// beyond the header are ignored.
pub fn read_csv_rows<R: Read>(reader: R, delimiter: u8) -> Result<Vec<Row>, DataError> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        let mut row = Row::new();

        for (name, cell) in headers.iter().zip(record.iter()) {
            let value = if cell.is_empty() {
                Value::Missing
            } else {
                Value::Text(cell.to_string())
            };
            row.insert(name.as_str(), value);
        }

        rows.push(row);
    }

    Ok(rows)
}

/// Parse comma-separated text into rows
pub fn parse_csv(text: &str) -> Result<Vec<Row>, DataError> {
    read_csv_rows(text.as_bytes(), b',')
}

/// Write rows as CSV.
///
/// The header is the key list of the first row and every row is rendered in
/// that order. Cells holding a delimiter, quote or line break are quoted with
/// inner quotes doubled. Nothing is written for an empty row set.
pub fn write_csv<W: Write>(rows: &[Row], writer: W) -> Result<(), DataError> {
    let first = match rows.first() {
        Some(row) => row,
        None => return Ok(()),
    };
    let headers: Vec<&str> = first.keys().collect();

    let mut builder = WriterBuilder::new();
    builder
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'));
    let mut csv_writer = builder.from_writer(writer);

    csv_writer.write_record(&headers)?;
    for row in rows {
        let record: Vec<String> = headers
            .iter()
            .map(|name| row.value(name).to_string())
            .collect();
        if record.len() == 1 && record[0].is_empty() {
            // The writer would emit `""` for a lone empty field
            csv_writer.flush()?;
            let mut inner = csv_writer.into_inner().map_err(|e| e.into_error())?;
            inner.write_all(b"\n")?;
            csv_writer = builder.from_writer(inner);
        } else {
            csv_writer.write_record(&record)?;
        }
    }

    csv_writer.flush()?;
    Ok(())
}

/// Render rows as CSV text, lines joined by `\n` without a trailing newline
pub fn to_csv_string(rows: &[Row]) -> Result<String, DataError> {
    let mut buffer = Vec::new();
    write_csv(rows, &mut buffer)?;

    let mut text = String::from_utf8(buffer).map_err(|e| DataError::ParseError(e.to_string()))?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}
