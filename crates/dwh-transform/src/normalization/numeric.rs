//! Numeric normalization utilities.

use dwh_model::CellValue;
pub use dwh_model::format_numeric;

/// Parses a string as f64, returning None for invalid or empty strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    if value.trim().is_empty() {
        return None;
    }
    value.trim().parse::<f64>().ok()
}

/// Numeric reading of a cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Null,
    Value(f64),
    /// Present but not a number.
    Invalid,
}

/// Reads a cell as a number. Booleans read as 1 and 0.
pub fn numeric_value(value: &CellValue) -> Numeric {
    match value {
        CellValue::Null => Numeric::Null,
        CellValue::Number(number) => Numeric::Value(*number),
        CellValue::Bool(flag) => Numeric::Value(if *flag { 1.0 } else { 0.0 }),
        CellValue::Text(text) => parse_f64(text).map_or(Numeric::Invalid, Numeric::Value),
        CellValue::Date(_) | CellValue::ObjectId(_) => Numeric::Invalid,
    }
}
