//! Collections exported as JSON files.
//!
//! A store root holds one file per collection: `<name>.jsonl` with one
//! document per line, or `<name>.json` with an array of documents (or a
//! single document). When both exist the line-delimited export wins.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use dwh_model::Record;
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, SourceError};
use crate::extended::record_from_json;
use crate::store::DocumentStore;

/// Export file layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Newline-delimited documents.
    JsonLines,
    /// A JSON array, or a single object.
    Json,
}

impl ExportFormat {
    fn extension(self) -> &'static str {
        match self {
            ExportFormat::JsonLines => "jsonl",
            ExportFormat::Json => "json",
        }
    }
}

/// Document store backed by a directory of collection exports.
#[derive(Debug, Clone)]
pub struct JsonExportStore {
    root: PathBuf,
}

impl JsonExportStore {
    /// Opens a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::DirectoryNotFound`] when `root` is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(SourceError::DirectoryNotFound { path: root });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Locates the export file for `collection`.
    pub fn export_path(&self, collection: &str) -> Option<(PathBuf, ExportFormat)> {
        [ExportFormat::JsonLines, ExportFormat::Json]
            .into_iter()
            .map(|format| {
                let path = self
                    .root
                    .join(format!("{collection}.{}", format.extension()));
                (path, format)
            })
            .find(|(path, _)| path.is_file())
    }
}

impl DocumentStore for JsonExportStore {
    fn find_all(&self, collection: &str) -> Result<Vec<Record>> {
        let Some((path, format)) = self.export_path(collection) else {
            return Err(SourceError::CollectionNotFound {
                collection: collection.to_string(),
                root: self.root.clone(),
            });
        };
        let records = match format {
            ExportFormat::JsonLines => read_json_lines(&path)?,
            ExportFormat::Json => read_json(&path)?,
        };
        debug!(
            collection,
            path = %path.display(),
            records = records.len(),
            "read collection export"
        );
        Ok(records)
    }
}

/// Reads a newline-delimited export, skipping blank lines.
pub fn read_json_lines(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path).map_err(|source| SourceError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| SourceError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(trimmed).map_err(|e| SourceError::JsonParse {
            path: path.to_path_buf(),
            line: index + 1,
            message: e.to_string(),
        })?;
        let record = record_from_json(value).ok_or_else(|| SourceError::NotADocument {
            path: path.to_path_buf(),
            index: records.len(),
        })?;
        records.push(record);
    }

    Ok(records)
}

/// Reads a JSON export holding an array of documents or a single document.
pub fn read_json(path: &Path) -> Result<Vec<Record>> {
    let content = fs::read_to_string(path).map_err(|source| SourceError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&content).map_err(|e| SourceError::JsonParse {
        path: path.to_path_buf(),
        line: e.line(),
        message: e.to_string(),
    })?;
    let values = match value {
        Value::Array(items) => items,
        other => vec![other],
    };
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            record_from_json(value).ok_or_else(|| SourceError::NotADocument {
                path: path.to_path_buf(),
                index,
            })
        })
        .collect()
}
