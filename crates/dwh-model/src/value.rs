//! Scalar cell values held by flattened rows.

use chrono::NaiveDateTime;
use serde_json::Value;

use crate::document::{ObjectId, format_timestamp, number_to_json};

/// A single cell of a flattened row.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Date(NaiveDateTime),
    /// Foreign identifier; only present between flattening and coercion.
    ObjectId(ObjectId),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Date(value) => Some(*value),
            _ => None,
        }
    }

    /// String form of the value, `None` for null.
    ///
    /// Used both for warehouse stringification and for comparing keys, so
    /// `1` and `1.0` render identically.
    pub fn render(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Bool(value) => Some(value.to_string()),
            CellValue::Number(value) => Some(format_numeric(*value)),
            CellValue::Text(value) => Some(value.clone()),
            CellValue::Date(value) => Some(format_timestamp(*value)),
            CellValue::ObjectId(id) => Some(id.to_hex()),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            CellValue::Null => Value::Null,
            CellValue::Bool(value) => Value::Bool(*value),
            CellValue::Number(value) => number_to_json(*value),
            CellValue::Text(value) => Value::String(value.clone()),
            CellValue::Date(value) => Value::String(format_timestamp(*value)),
            CellValue::ObjectId(id) => Value::String(id.to_hex()),
        }
    }

    /// Maps a JSON value back to a cell. Nested JSON is kept as compact text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => CellValue::Null,
            Value::Bool(value) => CellValue::Bool(*value),
            Value::Number(number) => number.as_f64().map_or(CellValue::Null, CellValue::Number),
            Value::String(text) => CellValue::Text(text.clone()),
            Value::Array(_) | Value::Object(_) => CellValue::Text(value.to_string()),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::Date(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::Null, Into::into)
    }
}

/// Formats a number without a trailing fractional part for whole values.
pub fn format_numeric(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
