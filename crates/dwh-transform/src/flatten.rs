//! Flattening of nested documents into tabular rows.
//!
//! Every leaf of a record becomes one column named by joining the keys on
//! the way down with [`PATH_SEPARATOR`]. Empty objects are leaves holding
//! null; arrays are leaves holding their compact JSON text.

use dwh_model::{CellValue, Dataset, Document, Record, Row};

/// Separator between path segments in column names.
pub const PATH_SEPARATOR: char = '.';

/// Flattens records into a dataset, preserving record order.
pub fn flatten_records(records: &[Record]) -> Dataset {
    records.iter().map(flatten_record).collect()
}

/// Flattens a single record into a row.
pub fn flatten_record(record: &Record) -> Row {
    let mut row = Row::new();
    for (key, value) in record {
        flatten_into(&mut row, key.clone(), value);
    }
    row
}

fn flatten_into(row: &mut Row, path: String, node: &Document) {
    match node {
        Document::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                flatten_into(row, format!("{path}{PATH_SEPARATOR}{key}"), child);
            }
        }
        leaf => {
            row.insert(path, leaf_value(leaf));
        }
    }
}

fn leaf_value(node: &Document) -> CellValue {
    match node {
        Document::Null | Document::Object(_) => CellValue::Null,
        Document::Bool(value) => CellValue::Bool(*value),
        Document::Number(value) => CellValue::Number(*value),
        Document::String(value) => CellValue::Text(value.clone()),
        Document::ObjectId(id) => CellValue::ObjectId(*id),
        Document::DateTime(dt) => CellValue::Date(*dt),
        Document::Array(_) => CellValue::Text(node.to_json().to_string()),
    }
}

/// Rebuilds the nested structure of a flattened row.
///
/// Reverses the path join; values keep their cell types.
pub fn nest(row: &Row) -> Record {
    let mut record = Record::new();
    for (path, value) in row {
        let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
        insert_path(&mut record, &segments, cell_to_document(value));
    }
    record
}

fn insert_path(record: &mut Record, segments: &[&str], value: Document) {
    match segments {
        [] => {}
        [last] => {
            record.insert((*last).to_string(), value);
        }
        [head, rest @ ..] => {
            let entry = record
                .entry((*head).to_string())
                .or_insert_with(|| Document::Object(Record::new()));
            if let Document::Object(child) = entry {
                insert_path(child, rest, value);
            } else {
                let mut child = Record::new();
                insert_path(&mut child, rest, value);
                *entry = Document::Object(child);
            }
        }
    }
}

fn cell_to_document(value: &CellValue) -> Document {
    match value {
        CellValue::Null => Document::Null,
        CellValue::Bool(value) => Document::Bool(*value),
        CellValue::Number(value) => Document::Number(*value),
        CellValue::Text(value) => Document::String(value.clone()),
        CellValue::Date(dt) => Document::DateTime(*dt),
        CellValue::ObjectId(id) => Document::ObjectId(*id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: Vec<(&str, Document)>) -> Record {
        pairs
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect()
    }

    #[test]
    fn nested_objects_become_dotted_columns() {
        let rec = record(vec![
            ("name", "A".into()),
            (
                "address",
                record(vec![("city", "Tunis".into()), ("zip", 1000.0.into())]).into(),
            ),
        ]);
        let row = flatten_record(&rec);
        assert_eq!(row.get("address.city"), Some(&CellValue::from("Tunis")));
        assert_eq!(row.get("address.zip"), Some(&CellValue::Number(1000.0)));
        assert!(!row.contains_key("address"));
    }

    #[test]
    fn empty_object_is_a_null_leaf() {
        let rec = record(vec![("meta", Record::new().into())]);
        let row = flatten_record(&rec);
        assert_eq!(row.get("meta"), Some(&CellValue::Null));
    }

    #[test]
    fn arrays_are_json_text() {
        let rec = record(vec![(
            "tags",
            vec![Document::from("a"), Document::from(2.0)].into(),
        )]);
        let row = flatten_record(&rec);
        assert_eq!(row.get("tags"), Some(&CellValue::from("[\"a\",2]")));
    }

    #[test]
    fn union_of_columns_with_nulls() {
        let dataset = flatten_records(&[
            record(vec![("a", 1.0.into())]),
            record(vec![("b", record(vec![("c", true.into())]).into())]),
        ]);
        assert_eq!(dataset.columns(), ["a", "b.c"]);
        assert_eq!(dataset.value(0, "b.c"), &CellValue::Null);
        assert_eq!(dataset.value(1, "b.c"), &CellValue::Bool(true));
    }

    #[test]
    fn nest_reverses_flatten() {
        let rec = record(vec![
            ("x", record(vec![("y", record(vec![("z", 1.0.into())]).into())]).into()),
            ("w", "v".into()),
        ]);
        assert_eq!(nest(&flatten_record(&rec)), rec);
    }
}
