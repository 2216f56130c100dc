//! Append-only loading of new rows.

use std::time::Instant;

use dwh_model::{CellValue, Dataset, TableId};
use tracing::{debug, info};

use crate::error::{Result, WarehouseError};
use crate::warehouse::Warehouse;

/// Outcome of loading one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub table: TableId,
    /// `None` when there was nothing to load.
    pub job_id: Option<String>,
    pub rows_loaded: usize,
}

/// Stringifies every non-null value of columns the warehouse cannot store
/// natively (text, identifier and mixed columns). Returns the columns that
/// were rewritten.
pub fn finalize_types(dataset: &mut Dataset) -> Vec<String> {
    let columns: Vec<String> = dataset
        .columns()
        .iter()
        .filter(|column| !dataset.column_type(column).is_warehouse_native())
        .cloned()
        .collect();
    for column in &columns {
        dataset.map_column(column, |value| {
            value.render().map_or(CellValue::Null, CellValue::Text)
        });
    }
    columns
}

/// Loads `dataset` into `table` and waits for the job to finish.
///
/// An empty dataset is a no-op and the warehouse is not contacted.
///
/// # Errors
///
/// Job failures are returned as is; nothing is retried. A job that reports
/// a different row count than submitted is a
/// [`WarehouseError::RowCountMismatch`].
pub fn load_dataset<W: Warehouse + ?Sized>(
    warehouse: &W,
    mut dataset: Dataset,
    table: &TableId,
) -> Result<LoadReport> {
    if dataset.is_empty() {
        debug!(table = %table, "nothing to load");
        return Ok(LoadReport {
            table: table.clone(),
            job_id: None,
            rows_loaded: 0,
        });
    }

    let start = Instant::now();
    let stringified = finalize_types(&mut dataset);
    if !stringified.is_empty() {
        debug!(table = %table, columns = ?stringified, "stringified columns");
    }

    let job = warehouse.load_append(&dataset, table)?;
    let job_id = job.job_id().to_string();
    let outcome = job.wait()?;
    if outcome.rows_loaded != dataset.len() {
        return Err(WarehouseError::RowCountMismatch {
            table: table.clone(),
            expected: dataset.len(),
            loaded: outcome.rows_loaded,
        });
    }

    info!(
        table = %table,
        job_id = %job_id,
        rows = outcome.rows_loaded,
        duration_ms = start.elapsed().as_millis(),
        "load complete"
    );
    Ok(LoadReport {
        table: table.clone(),
        job_id: Some(job_id),
        rows_loaded: outcome.rows_loaded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dwh_model::{ObjectId, Row};

    #[test]
    fn finalize_stringifies_mixed_and_identifier_columns() {
        let id = ObjectId::parse_str("5f8d0d55b54764421b7156c3").unwrap();
        let mut dataset = Dataset::from_rows(vec![
            Row::from([
                ("mixed".to_string(), CellValue::Number(1.0)),
                ("ref".to_string(), CellValue::ObjectId(id)),
                ("n".to_string(), CellValue::Number(2.5)),
            ]),
            Row::from([
                ("mixed".to_string(), CellValue::from("x")),
                ("ref".to_string(), CellValue::Null),
            ]),
        ]);
        let columns = finalize_types(&mut dataset);

        assert_eq!(columns, ["mixed", "ref"]);
        assert_eq!(dataset.value(0, "mixed"), &CellValue::from("1"));
        assert_eq!(dataset.value(0, "ref"), &CellValue::from("5f8d0d55b54764421b7156c3"));
        assert_eq!(dataset.value(1, "ref"), &CellValue::Null);
        assert_eq!(dataset.value(0, "n"), &CellValue::Number(2.5));
    }
}
