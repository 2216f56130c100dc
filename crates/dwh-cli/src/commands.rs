use std::time::Instant;

use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::{info, info_span};

use dwh_cli::config::EtlConfig;
use dwh_cli::pipeline::{RunOptions, run_pipeline};
use dwh_cli::types::RunResult;
use dwh_source::JsonExportStore;
use dwh_transform::ProfileKind;
use dwh_warehouse::LocalWarehouse;

use crate::cli::RunArgs;
use crate::summary::apply_table_style;

pub fn run_profiles() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec![
        "Profile",
        "Date fields",
        "Derived columns",
        "Artifact markers",
        "Artifact prefixes",
    ]);
    apply_table_style(&mut table);
    for kind in ProfileKind::ALL {
        let profile = kind.profile();
        table.add_row(vec![
            profile.name.clone(),
            profile.date_fields.join(", "),
            or_dash(profile.derived_columns().join(", ")),
            or_dash(profile.artifacts.markers.join(", ")),
            or_dash(profile.artifacts.prefixes.join(", ")),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn or_dash(value: String) -> String {
    if value.is_empty() { "-".to_string() } else { value }
}

pub fn run_etl(args: &RunArgs) -> Result<RunResult> {
    let config = load_config(args)?;
    let jobs = config.jobs(&args.collections)?;

    let run_span = info_span!(
        "run",
        project = %config.warehouse.project,
        dry_run = args.dry_run
    );
    let _run_guard = run_span.enter();
    let run_start = Instant::now();

    let store = JsonExportStore::open(config.source.path.clone()).context("open document store")?;
    let warehouse = LocalWarehouse::new(config.warehouse.path.clone());
    info!(
        source = %store.root().display(),
        warehouse = %warehouse.root().display(),
        collections = jobs.len(),
        "starting run"
    );

    let options = RunOptions {
        dry_run: args.dry_run,
    };
    let result = run_pipeline(&store, &warehouse, &jobs, options, |summary| {
        println!("{}", summary.status_line());
    })?;

    info!(
        loaded = result.total_loaded(),
        duration_ms = run_start.elapsed().as_millis(),
        "run complete"
    );
    Ok(result)
}

/// Config file (or defaults) with command-line overrides applied.
fn load_config(args: &RunArgs) -> Result<EtlConfig> {
    let mut config = match &args.config {
        Some(path) => EtlConfig::load(path)?,
        None => EtlConfig::default(),
    };
    if let Some(path) = &args.source {
        config.source.path.clone_from(path);
    }
    if let Some(path) = &args.warehouse {
        config.warehouse.path.clone_from(path);
    }
    if let Some(project) = &args.project {
        config.warehouse.project.clone_from(project);
    }
    config.validate()?;
    Ok(config)
}
