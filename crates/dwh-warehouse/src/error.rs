//! Error types for warehouse access.

use std::path::PathBuf;

use dwh_model::TableId;
use thiserror::Error;

/// Errors returned by warehouse backends and the loader.
#[derive(Debug, Error)]
pub enum WarehouseError {
    // === Query Errors ===
    /// The queried table does not exist.
    #[error("table not found: {table}")]
    TableNotFound { table: TableId },

    /// The statement is not a supported key query.
    #[error("unsupported query: {sql}")]
    UnsupportedQuery { sql: String },

    // === Load Errors ===
    /// A load job finished with an error.
    #[error("load job {job_id} failed: {reason}")]
    LoadFailed { job_id: String, reason: String },

    /// A load job reported a different row count than submitted.
    #[error("load into {table} wrote {loaded} rows, expected {expected}")]
    RowCountMismatch {
        table: TableId,
        expected: usize,
        loaded: usize,
    },

    // === Storage Errors ===
    /// Failed to read or write a table file.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored row is not valid JSON. `line` is 1-based.
    #[error("corrupt table file {path} (line {line}): {message}")]
    CorruptTable {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

/// Result type for warehouse operations.
pub type Result<T> = std::result::Result<T, WarehouseError>;
