//! CLI argument definitions for the ETL runner.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "dwh-etl",
    version,
    about = "Copy document collections into warehouse tables",
    long_about = "Copy document collections into analytical warehouse tables.\n\n\
                  Documents are flattened, normalized and enriched per collection \
                  profile; only rows whose key is not yet in the target table are loaded."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the ETL for the configured collections.
    Run(RunArgs),

    /// List the built-in enrichment profiles.
    Profiles,
}

#[derive(Parser)]
pub struct RunArgs {
    /// TOML configuration file (built-in defaults when omitted).
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory of collection exports (overrides [source] path).
    #[arg(long = "source", value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Local warehouse directory (overrides [warehouse] path).
    #[arg(long = "warehouse", value_name = "DIR")]
    pub warehouse: Option<PathBuf>,

    /// Warehouse project (overrides [warehouse] project).
    #[arg(long = "project", value_name = "ID")]
    pub project: Option<String>,

    /// Only run these collections (repeatable).
    #[arg(long = "collection", value_name = "NAME")]
    pub collections: Vec<String>,

    /// Extract, transform and diff without loading.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
