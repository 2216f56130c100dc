//! Incremental diff against keys already in the warehouse.
//!
//! The warehouse keys are the de-duplication ledger: a row is new when its
//! key is not yet stored in the target table. Keys are compared by their
//! rendered form, so `1` and `1.0` are the same key.

use std::collections::BTreeSet;

use dwh_model::{CellValue, Dataset, TableId};
use tracing::{debug, warn};

use crate::error::Result;
use crate::query::KeyQuery;
use crate::warehouse::Warehouse;

/// Fetches the distinct keys stored in `table`.
pub fn existing_keys<W: Warehouse + ?Sized>(
    warehouse: &W,
    table: &TableId,
    key_column: &str,
) -> Result<BTreeSet<String>> {
    let sql = KeyQuery::distinct(key_column, table).to_sql();
    let result = warehouse.query(&sql)?;
    Ok(result
        .column_values(key_column)
        .filter_map(CellValue::render)
        .collect())
}

/// Keeps only the rows whose key is not stored in `table`.
///
/// Rows with a null key are kept. When the dataset has no key column or the
/// key query fails (typically because the table does not exist yet) the
/// whole dataset is returned.
pub fn filter_new_rows<W: Warehouse + ?Sized>(
    warehouse: &W,
    mut dataset: Dataset,
    table: &TableId,
    key_column: &str,
) -> Dataset {
    if !dataset.has_column(key_column) {
        warn!(
            table = %table,
            key_column,
            "dataset has no key column, keeping every row"
        );
        return dataset;
    }

    let existing = match existing_keys(warehouse, table, key_column) {
        Ok(keys) => keys,
        Err(error) => {
            warn!(
                table = %table,
                %error,
                "key query failed, treating every row as new"
            );
            return dataset;
        }
    };

    let before = dataset.len();
    dataset.retain_rows(|row| {
        row.get(key_column)
            .and_then(CellValue::render)
            .is_none_or(|key| !existing.contains(&key))
    });
    debug!(
        table = %table,
        existing = existing.len(),
        kept = dataset.len(),
        skipped = before - dataset.len(),
        "filtered rows against warehouse keys"
    );
    dataset
}
