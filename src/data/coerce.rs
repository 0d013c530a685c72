// Cell coercion rules shared by inference, filtering, sorting and cleaning
// Author: Gabriel Demetrios Lafis

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

use super::Value;

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("valid number pattern")
    })
}

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{4}-\d{2}-\d{2}|\d{1,2}/\d{1,2}/\d{4})").expect("valid date pattern")
    })
}

/// Parse a whole string as a decimal number.
///
/// Surrounding whitespace is ignored. `NaN` and infinity spellings are
/// rejected, so a `Some` result is always a real number.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if !number_pattern().is_match(trimmed) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a calendar date or timestamp
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(datetime);
        }
    }

    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.naive_utc())
}

/// Whether text starts like an ISO (`YYYY-MM-DD`) or slash (`MM/DD/YYYY`) date
pub fn matches_date_pattern(text: &str) -> bool {
    date_pattern().is_match(text.trim())
}

/// A value that counts as a date during type inference
pub fn looks_like_date(value: &Value) -> bool {
    match value {
        Value::Date(_) => true,
        Value::Text(s) => matches_date_pattern(s) && parse_date(s).is_some(),
        _ => false,
    }
}

/// Loose equality between a cell and a condition value.
///
/// When either side is a number the other side is coerced numerically, so
/// `"5"` equals `5`. Missing only equals missing. Anything else compares by
/// string form.
pub fn loose_equals(cell: &Value, target: &Value) -> bool {
    if cell.is_missing() || target.is_missing() {
        return cell.is_missing() && target.is_missing();
    }

    match (cell, target) {
        (Value::Number(a), other) | (other, Value::Number(a)) => {
            other.as_number().map_or(false, |b| b == *a)
        }
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        _ => cell.to_string() == target.to_string(),
    }
}

/// Default string conversion for numbers
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        // covers negative zero
        "0".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else {
        n.to_string()
    }
}
