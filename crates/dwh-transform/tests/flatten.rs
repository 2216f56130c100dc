//! Structural properties of flattening.

use dwh_model::{CellValue, Document, Record};
use dwh_transform::{flatten_record, flatten_records, nest};
use proptest::prelude::*;

fn leaf() -> impl Strategy<Value = Document> {
    prop_oneof![
        Just(Document::Null),
        any::<bool>().prop_map(Document::Bool),
        (-1.0e9..1.0e9f64).prop_map(Document::Number),
        "[a-z0-9 ]{0,8}".prop_map(Document::String),
    ]
}

fn document() -> impl Strategy<Value = Document> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop::collection::btree_map("[a-z]{1,6}", inner, 1..4).prop_map(Document::Object)
    })
}

fn record() -> impl Strategy<Value = Record> {
    prop::collection::btree_map("[a-z]{1,6}", document(), 0..6)
}

fn leaf_count(document: &Document) -> usize {
    match document {
        Document::Object(map) if !map.is_empty() => map.values().map(leaf_count).sum(),
        _ => 1,
    }
}

proptest! {
    #[test]
    fn nest_reconstructs_flattened_record(rec in record()) {
        prop_assert_eq!(nest(&flatten_record(&rec)), rec);
    }

    #[test]
    fn one_column_per_leaf(rec in record()) {
        let row = flatten_record(&rec);
        prop_assert_eq!(row.len(), rec.values().map(leaf_count).sum::<usize>());
    }
}

#[test]
fn rows_keep_input_order() {
    let records: Vec<Record> = (0..5)
        .map(|i| Record::from([("n".to_string(), Document::from(i64::from(i)))]))
        .collect();
    let dataset = flatten_records(&records);
    let values: Vec<CellValue> = dataset.column_values("n").cloned().collect();
    assert_eq!(
        values,
        (0..5).map(|i| CellValue::from(i64::from(i))).collect::<Vec<_>>()
    );
}

#[test]
fn identifiers_survive_flattening() {
    let id = dwh_model::ObjectId::parse_str("64b7f0c2a1d3e4f5a6b7c8d9").unwrap();
    let rec = Record::from([("_id".to_string(), Document::ObjectId(id))]);
    let row = flatten_record(&rec);
    assert_eq!(row.get("_id"), Some(&CellValue::ObjectId(id)));
}
