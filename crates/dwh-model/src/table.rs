//! Warehouse table identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// A fully qualified `project.dataset.table` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableId {
    project: String,
    dataset: String,
    table: String,
}

impl TableId {
    pub fn new(project: &str, dataset: &str, table: &str) -> Result<Self> {
        let valid = [project, dataset, table].iter().all(|part| is_valid_part(part));
        if !valid {
            return Err(ModelError::InvalidTableId {
                value: format!("{project}.{dataset}.{table}"),
            });
        }
        Ok(Self {
            project: project.to_string(),
            dataset: dataset.to_string(),
            table: table.to_string(),
        })
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

fn is_valid_part(part: &str) -> bool {
    !part.is_empty()
        && !part
            .chars()
            .any(|ch| ch == '.' || ch == '`' || ch.is_whitespace())
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.project, self.dataset, self.table)
    }
}

impl FromStr for TableId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        match parts.as_slice() {
            [project, dataset, table] => Self::new(project, dataset, table),
            _ => Err(ModelError::InvalidTableId {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for TableId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TableId> for String {
    fn from(value: TableId) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_three_part_identifier() {
        let id: TableId = "dwh-project.esi_dataset.esis".parse().unwrap();
        assert_eq!(id.project(), "dwh-project");
        assert_eq!(id.dataset(), "esi_dataset");
        assert_eq!(id.table(), "esis");
        assert_eq!(id.to_string(), "dwh-project.esi_dataset.esis");
    }

    #[test]
    fn rejects_malformed_identifiers() {
        assert!("dataset.table".parse::<TableId>().is_err());
        assert!("a..c".parse::<TableId>().is_err());
        assert!("a.b.c.d".parse::<TableId>().is_err());
        assert!(TableId::new("p", "d", "bad`name").is_err());
    }
}
