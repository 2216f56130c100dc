//! Extended JSON decoding.
//!
//! Collection exports wrap typed values in single-key objects such as
//! `{"$oid": "..."}` or `{"$numberLong": "..."}`. Identifiers and numeric
//! wrappers are decoded the way a driver would decode them. `$date`
//! wrappers are left nested: the enrichment stage reads them from the
//! flattened `<field>.$date` columns.

use dwh_model::{Document, ObjectId, Record};
use serde_json::{Map, Value};

const OID_KEY: &str = "$oid";
const NUMBER_KEYS: [&str; 4] = ["$numberInt", "$numberLong", "$numberDouble", "$numberDecimal"];

/// Converts a JSON value into a document tree.
pub fn document_from_json(value: Value) -> Document {
    match value {
        Value::Null => Document::Null,
        Value::Bool(value) => Document::Bool(value),
        Value::Number(number) => number.as_f64().map_or(Document::Null, Document::Number),
        Value::String(text) => Document::String(text),
        Value::Array(items) => Document::Array(items.into_iter().map(document_from_json).collect()),
        Value::Object(map) => decode_wrapper(&map).unwrap_or_else(|| {
            Document::Object(
                map.into_iter()
                    .map(|(key, value)| (key, document_from_json(value)))
                    .collect(),
            )
        }),
    }
}

/// Converts a top-level JSON object into a record; `None` for non-objects.
pub fn record_from_json(value: Value) -> Option<Record> {
    match document_from_json(value) {
        Document::Object(record) => Some(record),
        _ => None,
    }
}

fn decode_wrapper(map: &Map<String, Value>) -> Option<Document> {
    if map.len() != 1 {
        return None;
    }
    let (key, value) = map.iter().next()?;
    if key == OID_KEY {
        let id = ObjectId::parse_str(value.as_str()?).ok()?;
        return Some(Document::ObjectId(id));
    }
    if NUMBER_KEYS.contains(&key.as_str()) {
        return decode_number(value).map(Document::Number);
    }
    None
}

fn decode_number(value: &Value) -> Option<f64> {
    match value {
        Value::String(text) => match text.trim() {
            "Infinity" => Some(f64::INFINITY),
            "-Infinity" => Some(f64::NEG_INFINITY),
            "NaN" => Some(f64::NAN),
            trimmed => trimmed.parse().ok(),
        },
        Value::Number(number) => number.as_f64(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_object_id_wrapper() {
        let doc = document_from_json(json!({"$oid": "5f8d0d55b54764421b7156c3"}));
        assert_eq!(
            doc,
            Document::ObjectId(ObjectId::parse_str("5f8d0d55b54764421b7156c3").unwrap())
        );
    }

    #[test]
    fn invalid_object_id_stays_nested() {
        let doc = document_from_json(json!({"$oid": "not-an-id"}));
        assert!(matches!(doc, Document::Object(ref map) if map.contains_key("$oid")));
    }

    #[test]
    fn decodes_number_wrappers() {
        assert_eq!(
            document_from_json(json!({"$numberLong": "42"})),
            Document::Number(42.0)
        );
        assert_eq!(
            document_from_json(json!({"$numberDecimal": "12.50"})),
            Document::Number(12.5)
        );
    }

    #[test]
    fn date_wrapper_stays_nested() {
        let doc = document_from_json(json!({"$date": "2023-01-15T00:00:00Z"}));
        let map = doc.as_object().unwrap();
        assert_eq!(
            map.get("$date"),
            Some(&Document::String("2023-01-15T00:00:00Z".to_string()))
        );
    }

    #[test]
    fn record_requires_object() {
        assert!(record_from_json(json!([1, 2])).is_none());
        assert!(record_from_json(json!({"a": 1})).is_some());
    }
}
