//! Source documents as a generic tagged value tree.
//!
//! Documents arrive from the document store as nested objects. Foreign
//! identifiers keep their own variant so that coercion can recognise them
//! after flattening.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde_json::{Map, Number, Value};

use crate::error::{ModelError, Result};

/// Length of an object identifier in bytes.
pub const OBJECT_ID_LEN: usize = 12;

/// A 12-byte foreign identifier, rendered as 24 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectId {
    pub const fn from_bytes(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Parses the 24 character hex form.
    pub fn parse_str(value: &str) -> Result<Self> {
        let invalid = |reason: &str| ModelError::InvalidObjectId {
            value: value.to_string(),
            reason: reason.to_string(),
        };
        if value.len() != OBJECT_ID_LEN * 2 {
            return Err(invalid("expected 24 hex characters"));
        }
        let bytes = hex::decode(value).map_err(|e| invalid(&e.to_string()))?;
        let bytes: [u8; OBJECT_ID_LEN] = bytes
            .try_into()
            .map_err(|_| invalid("expected 12 bytes"))?;
        Ok(Self(bytes))
    }

    pub fn bytes(&self) -> [u8; OBJECT_ID_LEN] {
        self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_str(s)
    }
}

/// One source document before flattening.
pub type Record = BTreeMap<String, Document>;

/// A node of a source document.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Document {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    ObjectId(ObjectId),
    /// Native timestamp decoded by the driver, in UTC.
    DateTime(NaiveDateTime),
    Array(Vec<Document>),
    Object(BTreeMap<String, Document>),
}

impl Document {
    pub fn is_null(&self) -> bool {
        matches!(self, Document::Null)
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Document>> {
        match self {
            Document::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Converts the node to plain JSON.
    ///
    /// Identifiers become hex strings and timestamps ISO 8601 strings, so the
    /// result no longer distinguishes them from text.
    pub fn to_json(&self) -> Value {
        match self {
            Document::Null => Value::Null,
            Document::Bool(value) => Value::Bool(*value),
            Document::Number(value) => number_to_json(*value),
            Document::String(value) => Value::String(value.clone()),
            Document::ObjectId(id) => Value::String(id.to_hex()),
            Document::DateTime(dt) => Value::String(format_timestamp(*dt)),
            Document::Array(items) => Value::Array(items.iter().map(Document::to_json).collect()),
            Document::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

impl From<bool> for Document {
    fn from(value: bool) -> Self {
        Document::Bool(value)
    }
}

impl From<f64> for Document {
    fn from(value: f64) -> Self {
        Document::Number(value)
    }
}

impl From<i64> for Document {
    fn from(value: i64) -> Self {
        Document::Number(value as f64)
    }
}

impl From<&str> for Document {
    fn from(value: &str) -> Self {
        Document::String(value.to_string())
    }
}

impl From<String> for Document {
    fn from(value: String) -> Self {
        Document::String(value)
    }
}

impl From<ObjectId> for Document {
    fn from(value: ObjectId) -> Self {
        Document::ObjectId(value)
    }
}

impl From<NaiveDateTime> for Document {
    fn from(value: NaiveDateTime) -> Self {
        Document::DateTime(value)
    }
}

impl From<Record> for Document {
    fn from(value: Record) -> Self {
        Document::Object(value)
    }
}

impl From<Vec<Document>> for Document {
    fn from(value: Vec<Document>) -> Self {
        Document::Array(value)
    }
}

/// Renders a timestamp as ISO 8601 without offset; fractional seconds only when present.
pub fn format_timestamp(value: NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

/// Whole numbers inside the exact `f64` integer range serialize as JSON integers.
pub(crate) fn number_to_json(value: f64) -> Value {
    const EXACT_LIMIT: f64 = 9_007_199_254_740_992.0;
    if value.fract() == 0.0 && value.abs() < EXACT_LIMIT {
        Value::Number(Number::from(value as i64))
    } else {
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn object_id_hex_roundtrip() {
        let id = ObjectId::parse_str("64B7F0C2A1D3E4F5A6B7C8D9").unwrap();
        assert_eq!(id.to_hex(), "64b7f0c2a1d3e4f5a6b7c8d9");
        assert_eq!(id.to_string().parse::<ObjectId>().unwrap(), id);
    }

    #[test]
    fn object_id_rejects_bad_input() {
        assert!(ObjectId::parse_str("64b7f0c2").is_err());
        assert!(ObjectId::parse_str("zzb7f0c2a1d3e4f5a6b7c8d9").is_err());
    }

    #[test]
    fn to_json_flattens_special_scalars() {
        let dt = NaiveDate::from_ymd_opt(2023, 1, 15)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        let mut record = Record::new();
        record.insert("when".to_string(), Document::DateTime(dt));
        record.insert("count".to_string(), Document::Number(3.0));
        record.insert("ratio".to_string(), Document::Number(0.5));
        let json = Document::Object(record).to_json();
        assert_eq!(json["when"], "2023-01-15T08:30:00");
        assert_eq!(json["count"], 3);
        assert_eq!(json["ratio"], 0.5);
    }
}
