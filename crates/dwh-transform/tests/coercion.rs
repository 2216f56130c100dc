//! Tests for field coercion over flattened datasets.

use dwh_model::{CellValue, ColumnType, Dataset, Document, ObjectId, Record};
use dwh_transform::{coerce_dataset, flatten_records};

fn record(pairs: Vec<(&str, Document)>) -> Record {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

fn sample() -> Dataset {
    let id = ObjectId::parse_str("5f8d0d55b54764421b7156c3").unwrap();
    flatten_records(&[
        record(vec![
            ("_id", id.into()),
            ("montant", "1200.50".into()),
            ("code", "A-12".into()),
            ("actif", true.into()),
            ("surface", 80.0.into()),
        ]),
        record(vec![
            ("montant", "300".into()),
            ("code", "42".into()),
            ("surface", Document::Null),
        ]),
    ])
}

#[test]
fn numeric_text_columns_become_numbers() {
    let mut dataset = sample();
    let summary = coerce_dataset(&mut dataset);

    assert!(summary.numeric.contains(&"montant".to_string()));
    assert_eq!(dataset.column_type("montant"), ColumnType::Number);
    assert_eq!(dataset.value(0, "montant"), &CellValue::Number(1200.5));
    assert_eq!(dataset.value(1, "montant"), &CellValue::Number(300.0));
}

#[test]
fn non_numeric_text_columns_stay_text() {
    let mut dataset = sample();
    let summary = coerce_dataset(&mut dataset);

    assert!(summary.text.contains(&"code".to_string()));
    assert_eq!(dataset.value(1, "code"), &CellValue::from("42"));
}

#[test]
fn identifier_column_is_stringified() {
    let mut dataset = sample();
    coerce_dataset(&mut dataset);

    assert_eq!(dataset.column_type("_id"), ColumnType::Text);
    assert_eq!(
        dataset.value(0, "_id"),
        &CellValue::from("5f8d0d55b54764421b7156c3")
    );
    assert_eq!(dataset.value(1, "_id"), &CellValue::Null);
}

#[test]
fn native_columns_are_untouched() {
    let mut dataset = sample();
    let before = dataset.clone();
    let summary = coerce_dataset(&mut dataset);

    for column in ["actif", "surface"] {
        assert!(!summary.numeric.contains(&column.to_string()));
        assert!(!summary.text.contains(&column.to_string()));
        assert_eq!(
            dataset.column_values(column).collect::<Vec<_>>(),
            before.column_values(column).collect::<Vec<_>>()
        );
    }
}

#[test]
fn numeric_looking_identifiers_are_cast() {
    // A hex id made only of digits reads as a number once stringified.
    let id = ObjectId::parse_str("123456789012345678901234").unwrap();
    let mut dataset = flatten_records(&[record(vec![("ref", id.into())])]);
    coerce_dataset(&mut dataset);
    assert_eq!(dataset.column_type("ref"), ColumnType::Number);
}
