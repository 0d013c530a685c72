// Validation utilities for request parameters
// Author: Gabriel Demetrios Lafis

use crate::data::{FieldType, Schema};

/// Validate that a field is declared in the schema
pub fn validate_field(schema: &Schema, name: &str) -> Result<(), String> {
    if schema.get_field_by_name(name).is_some() {
        Ok(())
    } else {
        Err(format!("Field '{}' not found", name))
    }
}

/// Validate that a field is declared with the given type
pub fn validate_field_type(schema: &Schema, name: &str, expected: FieldType) -> Result<(), String> {
    match schema.field_type(name) {
        Some(actual) if actual == expected => Ok(()),
        Some(actual) => Err(format!(
            "Field '{}' has type {}, expected {}",
            name, actual, expected
        )),
        None => Err(format!("Field '{}' not found", name)),
    }
}

/// Validate that a dataset name is usable in a URL path
pub fn validate_dataset_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Dataset name cannot be empty".to_string());
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(format!(
            "Dataset name '{}' may only contain letters, digits, '_', '-' and '.'",
            name
        ));
    }
    Ok(())
}

/// Validate that a numeric value is in range
pub fn validate_range<T: PartialOrd + std::fmt::Display>(
    value: T,
    min: T,
    max: T,
    name: &str,
) -> Result<(), String> {
    if value < min || value > max {
        Err(format!("'{}' must be between {} and {}", name, min, max))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SchemaBuilder;

    #[test]
    fn test_field_validation() {
        let schema = SchemaBuilder::new().add_number("n").add_string("s").build();
        assert!(validate_field(&schema, "n").is_ok());
        assert!(validate_field(&schema, "x").is_err());
        assert!(validate_field_type(&schema, "n", FieldType::Number).is_ok());
        assert!(validate_field_type(&schema, "s", FieldType::Number)
            .unwrap_err()
            .contains("expected number"));
    }

    #[test]
    fn test_dataset_name() {
        assert!(validate_dataset_name("sales-2024.v1").is_ok());
        assert!(validate_dataset_name("").is_err());
        assert!(validate_dataset_name("a/b").is_err());
    }

    #[test]
    fn test_range() {
        assert!(validate_range(5, 1, 10, "size").is_ok());
        assert_eq!(
            validate_range(0, 1, 10, "size").unwrap_err(),
            "'size' must be between 1 and 10"
        );
    }
}
