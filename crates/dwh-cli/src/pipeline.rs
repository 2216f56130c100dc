//! Per-collection ETL stages.
//!
//! Each collection runs extract, transform, diff and load in order and owns
//! its dataset end to end. Collections run one after another; the first
//! failure stops the run, and tables loaded before it stay loaded.

use std::time::Instant;

use anyhow::{Context, Result};
use dwh_model::Dataset;
use dwh_source::DocumentStore;
use dwh_transform::{EnrichmentProfile, coerce_dataset, enrich, flatten_records};
use dwh_warehouse::{Warehouse, filter_new_rows, load_dataset};
use tracing::{debug, info, info_span};

use crate::config::CollectionJob;
use crate::types::{CollectionSummary, RunResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Stop after the diff stage.
    pub dry_run: bool,
}

/// Reads a collection and turns it into a coerced dataset.
pub fn extract<S: DocumentStore + ?Sized>(store: &S, collection: &str) -> Result<Dataset> {
    let records = store
        .find_all(collection)
        .with_context(|| format!("extract collection {collection}"))?;
    let mut dataset = flatten_records(&records);
    let coercion = coerce_dataset(&mut dataset);
    debug!(
        collection,
        numeric = ?coercion.numeric,
        text = ?coercion.text,
        "coercion complete"
    );
    Ok(dataset)
}

/// Applies the enrichment profile.
pub fn transform(mut dataset: Dataset, profile: &EnrichmentProfile) -> Result<Dataset> {
    enrich(&mut dataset, profile)
        .with_context(|| format!("enrich with {} profile", profile.name))?;
    Ok(dataset)
}

/// Runs every stage for one collection.
pub fn run_collection<S, W>(
    store: &S,
    warehouse: &W,
    job: &CollectionJob,
    options: RunOptions,
) -> Result<CollectionSummary>
where
    S: DocumentStore + ?Sized,
    W: Warehouse + ?Sized,
{
    let span = info_span!(
        "collection",
        collection = %job.collection,
        table = %job.table
    );
    let _guard = span.enter();
    let run_start = Instant::now();

    let dataset = info_span!("extract").in_scope(|| -> Result<_> {
        let start = Instant::now();
        let dataset = extract(store, &job.collection)?;
        info!(
            rows = dataset.len(),
            columns = dataset.width(),
            duration_ms = start.elapsed().as_millis(),
            "extract complete"
        );
        Ok(dataset)
    })?;
    let extracted = dataset.len();

    let dataset = info_span!("transform").in_scope(|| -> Result<_> {
        let start = Instant::now();
        let dataset = transform(dataset, &job.profile)
            .with_context(|| format!("transform collection {}", job.collection))?;
        info!(
            profile = %job.profile.name,
            columns = dataset.width(),
            duration_ms = start.elapsed().as_millis(),
            "transform complete"
        );
        Ok(dataset)
    })?;
    let columns = dataset.width();

    let fresh = info_span!("diff").in_scope(|| {
        let start = Instant::now();
        let fresh = filter_new_rows(warehouse, dataset, &job.table, &job.key_column);
        info!(
            new_rows = fresh.len(),
            duration_ms = start.elapsed().as_millis(),
            "diff complete"
        );
        fresh
    });
    let new_rows = fresh.len();

    let (loaded, job_id) = if options.dry_run {
        debug!(new_rows, "dry run, skipping load");
        (0, None)
    } else {
        let report = info_span!("load")
            .in_scope(|| load_dataset(warehouse, fresh, &job.table))
            .with_context(|| format!("load into {}", job.table))?;
        (report.rows_loaded, report.job_id)
    };

    info!(
        extracted,
        new_rows,
        loaded,
        duration_ms = run_start.elapsed().as_millis(),
        "collection complete"
    );

    Ok(CollectionSummary {
        collection: job.collection.clone(),
        profile: job.profile.name.clone(),
        table: job.table.clone(),
        extracted,
        columns,
        new_rows,
        loaded,
        job_id,
        dry_run: options.dry_run,
    })
}

/// Runs `jobs` in order, calling `on_collection` after each one completes.
///
/// # Errors
///
/// Stops at the first failing collection.
pub fn run_pipeline<S, W, F>(
    store: &S,
    warehouse: &W,
    jobs: &[CollectionJob],
    options: RunOptions,
    mut on_collection: F,
) -> Result<RunResult>
where
    S: DocumentStore + ?Sized,
    W: Warehouse + ?Sized,
    F: FnMut(&CollectionSummary),
{
    let mut result = RunResult {
        collections: Vec::with_capacity(jobs.len()),
        dry_run: options.dry_run,
    };
    for job in jobs {
        let summary = run_collection(store, warehouse, job, options)?;
        on_collection(&summary);
        result.collections.push(summary);
    }
    Ok(result)
}
