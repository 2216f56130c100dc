//! Storage artifact columns.
//!
//! Flattening exposes wrapper keys such as `_id.$oid`, raw `$date` columns
//! and driver bookkeeping fields (`__v`). None of them belong in the
//! warehouse.

use dwh_model::Dataset;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Decides which columns are storage artifacts.
///
/// A column is an artifact when its name contains any marker or starts with
/// any prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactRule {
    pub markers: Vec<String>,
    pub prefixes: Vec<String>,
}

impl Default for ArtifactRule {
    fn default() -> Self {
        Self {
            markers: vec!["$oid".to_string(), "$date".to_string()],
            prefixes: vec!["__".to_string()],
        }
    }
}

impl ArtifactRule {
    pub fn is_artifact(&self, column: &str) -> bool {
        self.markers.iter().any(|marker| column.contains(marker.as_str()))
            || self
                .prefixes
                .iter()
                .any(|prefix| column.starts_with(prefix.as_str()))
    }

    /// Drops artifact columns, returning their names in column order.
    pub fn apply(&self, dataset: &mut Dataset) -> Vec<String> {
        let dropped = dataset.drop_columns(|column| self.is_artifact(column));
        if !dropped.is_empty() {
            debug!(columns = ?dropped, "dropped artifact columns");
        }
        dropped
    }
}
