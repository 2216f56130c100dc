//! Error types for document store access.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading source collections.
#[derive(Debug, Error)]
pub enum SourceError {
    // === Store Errors ===
    /// Store root directory not found.
    #[error("document store directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// No export exists for the requested collection.
    #[error("collection '{collection}' not found under {root}")]
    CollectionNotFound { collection: String, root: PathBuf },

    /// Failed to read an export file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Parsing Errors ===
    /// Malformed JSON in an export file. `line` is 1-based.
    #[error("failed to parse JSON in {path} (line {line}): {message}")]
    JsonParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// A top-level document is not a JSON object.
    #[error("document {index} in {path} is not an object")]
    NotADocument { path: PathBuf, index: usize },
}

/// Result type for source operations.
pub type Result<T> = std::result::Result<T, SourceError>;
