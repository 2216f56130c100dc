//! In-memory warehouse.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dwh_model::{Dataset, Row, TableId};

use crate::error::{Result, WarehouseError};
use crate::query::KeyQuery;
use crate::warehouse::{JobOutcome, LoadJob, Warehouse};

type Tables = BTreeMap<TableId, Vec<Row>>;

/// Warehouse holding tables in memory.
///
/// Clones share the same tables. A load can be armed to fail with
/// [`MemoryWarehouse::fail_next_load`].
#[derive(Debug, Clone, Default)]
pub struct MemoryWarehouse {
    tables: Arc<Mutex<Tables>>,
    failure: Arc<Mutex<Option<String>>>,
    jobs: Arc<AtomicU64>,
}

impl MemoryWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_table(self, table: &TableId, rows: Vec<Row>) -> Self {
        lock(&self.tables).insert(table.clone(), rows);
        self
    }

    /// Makes the next submitted load job fail with `reason`.
    pub fn fail_next_load(&self, reason: &str) {
        *lock(&self.failure) = Some(reason.to_string());
    }

    /// Rows stored in `table`, empty when the table does not exist.
    pub fn table_rows(&self, table: &TableId) -> Vec<Row> {
        lock(&self.tables).get(table).cloned().unwrap_or_default()
    }

    pub fn has_table(&self, table: &TableId) -> bool {
        lock(&self.tables).contains_key(table)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Warehouse for MemoryWarehouse {
    fn query(&self, sql: &str) -> Result<Dataset> {
        let query = KeyQuery::parse(sql)?;
        let tables = lock(&self.tables);
        let rows = tables
            .get(&query.table)
            .ok_or_else(|| WarehouseError::TableNotFound {
                table: query.table.clone(),
            })?;
        Ok(query.evaluate(rows))
    }

    fn load_append(&self, dataset: &Dataset, table: &TableId) -> Result<Box<dyn LoadJob>> {
        let sequence = self.jobs.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(Box::new(MemoryLoadJob {
            job_id: format!("memory-{}-{sequence}", table.table()),
            table: table.clone(),
            rows: dataset.rows().to_vec(),
            tables: Arc::clone(&self.tables),
            failure: lock(&self.failure).take(),
        }))
    }
}

struct MemoryLoadJob {
    job_id: String,
    table: TableId,
    rows: Vec<Row>,
    tables: Arc<Mutex<Tables>>,
    failure: Option<String>,
}

impl LoadJob for MemoryLoadJob {
    fn job_id(&self) -> &str {
        &self.job_id
    }

    fn wait(self: Box<Self>) -> Result<JobOutcome> {
        let job = *self;
        if let Some(reason) = job.failure {
            return Err(WarehouseError::LoadFailed {
                job_id: job.job_id,
                reason,
            });
        }
        let rows_loaded = job.rows.len();
        lock(&job.tables)
            .entry(job.table)
            .or_default()
            .extend(job.rows);
        Ok(JobOutcome { rows_loaded })
    }
}
