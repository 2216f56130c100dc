//! Tests for the file-backed warehouse.

use dwh_model::{CellValue, Dataset, Row, TableId};
use dwh_warehouse::{
    KeyQuery, LocalWarehouse, Warehouse, WarehouseError, filter_new_rows, load_dataset,
};
use tempfile::TempDir;

fn table() -> TableId {
    TableId::new("analytics", "eso_dataset", "esos").unwrap()
}

fn orders(ids: &[&str]) -> Dataset {
    ids.iter()
        .map(|id| {
            Row::from([
                ("_id".to_string(), CellValue::from(*id)),
                ("quantite".to_string(), CellValue::Number(3.0)),
            ])
        })
        .collect()
}

#[test]
fn table_path_follows_identifier() {
    let warehouse = LocalWarehouse::new("/data/warehouse");
    assert_eq!(
        warehouse.table_path(&table()),
        std::path::Path::new("/data/warehouse/analytics/eso_dataset/esos.jsonl")
    );
}

#[test]
fn query_on_missing_table_is_not_found() {
    let dir = TempDir::new().unwrap();
    let warehouse = LocalWarehouse::new(dir.path());
    let sql = KeyQuery::distinct("_id", &table()).to_sql();

    let err = warehouse.query(&sql).unwrap_err();

    assert!(matches!(err, WarehouseError::TableNotFound { .. }));
}

#[test]
fn nothing_is_written_before_wait() {
    let dir = TempDir::new().unwrap();
    let warehouse = LocalWarehouse::new(dir.path());

    let job = warehouse.load_append(&orders(&["a"]), &table()).unwrap();
    assert!(!warehouse.table_path(&table()).exists());

    assert_eq!(job.wait().unwrap().rows_loaded, 1);
    assert!(warehouse.table_path(&table()).is_file());
}

#[test]
fn loads_append_and_round_trip() {
    let dir = TempDir::new().unwrap();
    let warehouse = LocalWarehouse::new(dir.path());

    load_dataset(&warehouse, orders(&["a", "b"]), &table()).unwrap();
    load_dataset(&warehouse, orders(&["c"]), &table()).unwrap();

    let stored = warehouse.read_table(&table()).unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(stored.value(2, "_id"), &CellValue::from("c"));
    assert_eq!(stored.value(0, "quantite"), &CellValue::Number(3.0));
}

#[test]
fn rerun_loads_only_new_rows() {
    let dir = TempDir::new().unwrap();
    let warehouse = LocalWarehouse::new(dir.path());
    load_dataset(&warehouse, orders(&["a", "b"]), &table()).unwrap();

    let fresh = filter_new_rows(&warehouse, orders(&["a", "b", "c"]), &table(), "_id");
    let report = load_dataset(&warehouse, fresh, &table()).unwrap();

    assert_eq!(report.rows_loaded, 1);
    assert_eq!(warehouse.read_table(&table()).unwrap().len(), 3);
}

#[test]
fn corrupt_rows_are_reported_with_line() {
    let dir = TempDir::new().unwrap();
    let warehouse = LocalWarehouse::new(dir.path());
    let path = warehouse.table_path(&table());
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{\"_id\":\"a\"}\n[1,2]\n").unwrap();

    let err = warehouse.read_table(&table()).unwrap_err();

    assert!(matches!(err, WarehouseError::CorruptTable { line: 2, .. }));
}
