//! The warehouse seam.

use dwh_model::{Dataset, TableId};

use crate::error::Result;

/// Analytical warehouse client.
pub trait Warehouse {
    /// Runs a read query and returns its result set.
    fn query(&self, sql: &str) -> Result<Dataset>;

    /// Submits an append-only bulk load of `dataset` into `table`.
    ///
    /// Nothing is guaranteed to be written until the job is waited on.
    fn load_append(&self, dataset: &Dataset, table: &TableId) -> Result<Box<dyn LoadJob>>;
}

impl<W: Warehouse + ?Sized> Warehouse for &W {
    fn query(&self, sql: &str) -> Result<Dataset> {
        (**self).query(sql)
    }

    fn load_append(&self, dataset: &Dataset, table: &TableId) -> Result<Box<dyn LoadJob>> {
        (**self).load_append(dataset, table)
    }
}

/// A submitted load job.
pub trait LoadJob {
    fn job_id(&self) -> &str;

    /// Blocks until the job finishes.
    fn wait(self: Box<Self>) -> Result<JobOutcome>;
}

/// Result of a finished load job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobOutcome {
    pub rows_loaded: usize,
}
