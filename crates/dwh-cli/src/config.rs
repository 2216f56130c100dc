//! Run configuration loaded from TOML.
//!
//! Every section is optional. Without a file the run covers the two
//! built-in collections, `esis` (lease profile) and `esos` (order profile).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use dwh_model::{ModelError, TableId};
use dwh_transform::{ArtifactRule, EnrichmentProfile, ProfileKind};
use serde::{Deserialize, Serialize};

/// Primary key column used when a collection does not name one.
pub const DEFAULT_KEY_COLUMN: &str = "_id";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("duplicate collection in config: {name}")]
    DuplicateCollection { name: String },

    #[error("invalid target table for collection '{collection}': {source}")]
    InvalidTable {
        collection: String,
        #[source]
        source: ModelError,
    },

    #[error("invalid key column for collection '{collection}': '{key_column}'")]
    InvalidKeyColumn {
        collection: String,
        key_column: String,
    },

    #[error("collection '{name}' is not configured")]
    UnknownCollection { name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EtlConfig {
    pub source: SourceConfig,
    pub warehouse: WarehouseConfig,
    pub collections: Vec<CollectionConfig>,
    /// Replaces the artifact rule of every profile when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<ArtifactRule>,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            warehouse: WarehouseConfig::default(),
            collections: vec![
                CollectionConfig::new("esis", ProfileKind::Lease, "esi_dataset"),
                CollectionConfig::new("esos", ProfileKind::Order, "eso_dataset"),
            ],
            artifacts: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// Directory of collection exports.
    pub path: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/export"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WarehouseConfig {
    pub project: String,
    /// Root directory of the local warehouse.
    pub path: PathBuf,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            project: "local".to_string(),
            path: PathBuf::from("data/warehouse"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionConfig {
    pub name: String,
    pub profile: ProfileKind,
    pub dataset: String,
    /// Target table; the collection name when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default = "default_key_column")]
    pub key_column: String,
}

fn default_key_column() -> String {
    DEFAULT_KEY_COLUMN.to_string()
}

impl CollectionConfig {
    pub fn new(name: &str, profile: ProfileKind, dataset: &str) -> Self {
        Self {
            name: name.to_string(),
            profile,
            dataset: dataset.to_string(),
            table: None,
            key_column: default_key_column(),
        }
    }

    pub fn table_name(&self) -> &str {
        self.table.as_deref().unwrap_or(&self.name)
    }
}

/// One collection ready to run: where it goes and how it is enriched.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionJob {
    pub collection: String,
    pub table: TableId,
    pub key_column: String,
    pub profile: EnrichmentProfile,
}

impl EtlConfig {
    /// Loads and validates a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks collection names are unique, target tables well formed and key
    /// columns quotable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = BTreeSet::new();
        for collection in &self.collections {
            if !seen.insert(collection.name.as_str()) {
                return Err(ConfigError::DuplicateCollection {
                    name: collection.name.clone(),
                });
            }
            self.table_for(collection)?;
            let key = collection.key_column.as_str();
            if key.trim().is_empty() || key.contains('`') {
                return Err(ConfigError::InvalidKeyColumn {
                    collection: collection.name.clone(),
                    key_column: key.to_string(),
                });
            }
        }
        Ok(())
    }

    fn table_for(&self, collection: &CollectionConfig) -> Result<TableId, ConfigError> {
        TableId::new(
            &self.warehouse.project,
            &collection.dataset,
            collection.table_name(),
        )
        .map_err(|source| ConfigError::InvalidTable {
            collection: collection.name.clone(),
            source,
        })
    }

    /// Builds the jobs to run, in configuration order.
    ///
    /// An empty `only` selects every collection; otherwise each name must be
    /// configured.
    pub fn jobs(&self, only: &[String]) -> Result<Vec<CollectionJob>, ConfigError> {
        if let Some(name) = only
            .iter()
            .find(|name| !self.collections.iter().any(|c| &c.name == *name))
        {
            return Err(ConfigError::UnknownCollection { name: name.clone() });
        }

        self.collections
            .iter()
            .filter(|collection| only.is_empty() || only.contains(&collection.name))
            .map(|collection| {
                let mut profile = collection.profile.profile();
                if let Some(rule) = &self.artifacts {
                    profile = profile.with_artifacts(rule.clone());
                }
                Ok(CollectionJob {
                    collection: collection.name.clone(),
                    table: self.table_for(collection)?,
                    key_column: collection.key_column.clone(),
                    profile,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_both_collections() {
        let jobs = EtlConfig::default().jobs(&[]).unwrap();
        let tables: Vec<String> = jobs.iter().map(|job| job.table.to_string()).collect();
        assert_eq!(tables, ["local.esi_dataset.esis", "local.eso_dataset.esos"]);
        assert_eq!(jobs[0].profile, EnrichmentProfile::lease());
        assert_eq!(jobs[1].key_column, "_id");
    }

    #[test]
    fn partial_file_keeps_default_sections() {
        let config: EtlConfig = toml::from_str("[warehouse]\nproject = \"analytics\"\n").unwrap();
        assert_eq!(config.warehouse.project, "analytics");
        assert_eq!(config.warehouse.path, PathBuf::from("data/warehouse"));
        assert_eq!(config.collections.len(), 2);
    }

    #[test]
    fn duplicate_collections_are_rejected() {
        let mut config = EtlConfig::default();
        config.collections[1].name = "esis".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateCollection { name }) if name == "esis"
        ));
    }

    #[test]
    fn key_column_must_be_quotable() {
        let mut config = EtlConfig::default();
        config.collections[0].key_column = "order id".to_string();
        assert!(config.validate().is_ok());

        for key in ["ref`id", "  "] {
            config.collections[0].key_column = key.to_string();
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidKeyColumn { ref collection, ref key_column })
                    if collection == "esis" && key_column == key
            ));
        }
    }

    #[test]
    fn unknown_selection_is_rejected() {
        let err = EtlConfig::default().jobs(&["leases".to_string()]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownCollection { .. }));
    }

    #[test]
    fn artifact_override_reaches_profiles() {
        let config = EtlConfig {
            artifacts: Some(ArtifactRule {
                markers: vec!["$oid".to_string()],
                prefixes: Vec::new(),
            }),
            ..EtlConfig::default()
        };
        let jobs = config.jobs(&["esos".to_string()]).unwrap();
        assert_eq!(jobs.len(), 1);
        assert!(!jobs[0].profile.artifacts.is_artifact("__v"));
    }
}
