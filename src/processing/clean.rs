// Cleaning: coerce every declared field to its canonical form
// Author: Gabriel Demetrios Lafis

use log::debug;

use crate::data::{DataSet, Row, Schema};
use super::{DataProcessor, ProcessingError, ProcessorType};

/// Coerce a row to canonical form.
///
/// Every declared field ends up present: numbers parse (0 on failure or
/// when missing), strings are trimmed (empty when missing), dates are
/// normalized to a calendar date (missing when unparsable). Keys outside the
/// schema are kept untouched.
pub fn clean_row(row: &Row, schema: &Schema) -> Row {
    let mut cleaned = row.clone();
    for field in &schema.fields {
        let value = field.field_type.canonicalize(row.value(&field.name));
        cleaned.insert(field.name.as_str(), value);
    }
    cleaned
}

/// Clean every row against the schema
pub fn clean_rows(rows: &[Row], schema: &Schema) -> Vec<Row> {
    debug!("Cleaning {} rows over {} fields", rows.len(), schema.len());
    rows.iter().map(|row| clean_row(row, schema)).collect()
}

/// Produce dense, type-correct rows
pub struct CleanProcessor;

impl DataProcessor for CleanProcessor {
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        Ok(input.derive(clean_rows(&input.rows, &input.schema)))
    }

    fn name(&self) -> &str {
        "clean"
    }

    fn processor_type(&self) -> ProcessorType {
        ProcessorType::Clean
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SchemaBuilder, Value};
    use chrono::NaiveDate;

    fn schema() -> Schema {
        SchemaBuilder::new()
            .add_string("name")
            .add_number("n")
            .add_date("d")
            .build()
    }

    #[test]
    fn test_clean_makes_rows_dense() {
        let rows = vec![Row::new().with("name", "  Ann ")];
        let cleaned = clean_rows(&rows, &schema());

        assert_eq!(
            cleaned[0],
            Row::new()
                .with("name", "Ann")
                .with("n", 0.0)
                .with("d", Value::Missing)
        );
    }

    #[test]
    fn test_clean_coerces_values() {
        let rows = vec![Row::new()
            .with("name", 12.0)
            .with("n", "3.5")
            .with("d", "07/04/2024")
            .with("extra", " kept ")];
        let cleaned = clean_rows(&rows, &schema());

        assert_eq!(cleaned[0].value("name"), &Value::text("12"));
        assert_eq!(cleaned[0].value("n"), &Value::Number(3.5));
        assert_eq!(
            cleaned[0].value("d"),
            &Value::Date(NaiveDate::from_ymd_opt(2024, 7, 4).unwrap())
        );
        assert_eq!(cleaned[0].value("extra"), &Value::text(" kept "));
    }

    #[test]
    fn test_clean_is_idempotent() {
        let rows = vec![
            Row::new().with("name", " x ").with("n", "abc").with("d", "bad"),
            Row::new().with("n", "7").with("d", "2024-02-01T10:00:00"),
            Row::new().with("name", "").with("d", ""),
        ];
        let once = clean_rows(&rows, &schema());
        let twice = clean_rows(&once, &schema());
        assert_eq!(once, twice);
    }
}
