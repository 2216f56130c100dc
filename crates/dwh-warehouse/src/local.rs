//! File-backed warehouse.
//!
//! Each table is a JSON-lines file at
//! `<root>/<project>/<dataset>/<table>.jsonl`, one object per row. Loads
//! append to the file when the job is waited on; a table exists once its
//! first load has completed.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use dwh_model::{CellValue, Dataset, Row, TableId};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Result, WarehouseError};
use crate::query::KeyQuery;
use crate::warehouse::{JobOutcome, LoadJob, Warehouse};

#[derive(Debug)]
pub struct LocalWarehouse {
    root: PathBuf,
    jobs: AtomicU64,
}

impl LocalWarehouse {
    /// Creates a warehouse rooted at `root`. The directory is created on the
    /// first load.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            jobs: AtomicU64::new(0),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn table_path(&self, table: &TableId) -> PathBuf {
        self.root
            .join(table.project())
            .join(table.dataset())
            .join(format!("{}.jsonl", table.table()))
    }

    /// Reads every stored row of `table`.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::TableNotFound`] when the table file is absent.
    pub fn read_table(&self, table: &TableId) -> Result<Dataset> {
        let path = self.table_path(table);
        if !path.is_file() {
            return Err(WarehouseError::TableNotFound {
                table: table.clone(),
            });
        }
        let file = File::open(&path).map_err(|source| WarehouseError::Io {
            path: path.clone(),
            source,
        })?;

        let mut dataset = Dataset::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|source| WarehouseError::Io {
                path: path.clone(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let corrupt = |message: String| WarehouseError::CorruptTable {
                path: path.clone(),
                line: index + 1,
                message,
            };
            let value: Value = serde_json::from_str(&line).map_err(|e| corrupt(e.to_string()))?;
            let Value::Object(object) = value else {
                return Err(corrupt("row is not an object".to_string()));
            };
            dataset.push_row(
                object
                    .iter()
                    .map(|(column, value)| (column.clone(), CellValue::from_json(value)))
                    .collect(),
            );
        }
        Ok(dataset)
    }
}

impl Warehouse for LocalWarehouse {
    fn query(&self, sql: &str) -> Result<Dataset> {
        let query = KeyQuery::parse(sql)?;
        let table = self.read_table(&query.table)?;
        Ok(query.evaluate(table.rows()))
    }

    fn load_append(&self, dataset: &Dataset, table: &TableId) -> Result<Box<dyn LoadJob>> {
        let sequence = self.jobs.fetch_add(1, Ordering::Relaxed) + 1;
        let lines = dataset
            .rows()
            .iter()
            .map(|row| row_to_json(dataset.columns(), row).to_string())
            .collect();
        Ok(Box::new(LocalLoadJob {
            job_id: format!("local-{}-{sequence}", table.table()),
            path: self.table_path(table),
            lines,
        }))
    }
}

/// Serializes a row with every dataset column, absent values as null.
fn row_to_json(columns: &[String], row: &Row) -> Value {
    let object: Map<String, Value> = columns
        .iter()
        .map(|column| {
            let value = row.get(column).map_or(Value::Null, CellValue::to_json);
            (column.clone(), value)
        })
        .collect();
    Value::Object(object)
}

struct LocalLoadJob {
    job_id: String,
    path: PathBuf,
    lines: Vec<String>,
}

impl LocalLoadJob {
    fn append(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);
        for line in &self.lines {
            writeln!(writer, "{line}")?;
        }
        writer.flush()
    }
}

impl LoadJob for LocalLoadJob {
    fn job_id(&self) -> &str {
        &self.job_id
    }

    fn wait(self: Box<Self>) -> Result<JobOutcome> {
        self.append().map_err(|source| WarehouseError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(
            job_id = %self.job_id,
            path = %self.path.display(),
            rows = self.lines.len(),
            "load job finished"
        );
        Ok(JobOutcome {
            rows_loaded: self.lines.len(),
        })
    }
}
