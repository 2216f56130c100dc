use dwh_model::TableId;

/// Per-collection outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSummary {
    pub collection: String,
    pub profile: String,
    pub table: TableId,
    /// Documents read from the source.
    pub extracted: usize,
    /// Columns after enrichment.
    pub columns: usize,
    /// Rows not yet in the warehouse.
    pub new_rows: usize,
    pub loaded: usize,
    pub job_id: Option<String>,
    pub dry_run: bool,
}

impl CollectionSummary {
    /// The line printed once the collection is done.
    pub fn status_line(&self) -> String {
        if self.new_rows == 0 {
            format!("No new rows for {}", self.table)
        } else if self.dry_run {
            format!("Would load {} rows into {}", self.new_rows, self.table)
        } else {
            format!("Loaded {} rows into {}", self.loaded, self.table)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    pub collections: Vec<CollectionSummary>,
    pub dry_run: bool,
}

impl RunResult {
    pub fn total_loaded(&self) -> usize {
        self.collections.iter().map(|c| c.loaded).sum()
    }
}
