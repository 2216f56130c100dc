//! Transformation stages between extraction and loading.
//!
//! - **flatten**: nested records to dotted-column datasets
//! - **coercion**: identifier stringification and opportunistic numeric casts
//! - **enrich**: per-collection date parsing and derived business columns
//! - **artifacts**: removal of storage wrapper columns
//! - **normalization**: date, duration and numeric helpers

pub mod artifacts;
pub mod coercion;
pub mod enrich;
pub mod error;
pub mod flatten;
pub mod normalization;

pub use artifacts::ArtifactRule;
pub use coercion::{
    CastError, CoercionOutcome, CoercionSummary, cast_numeric, coerce_column, coerce_dataset,
    stringify_references,
};
pub use enrich::{
    EnrichmentProfile, EnrichmentReport, LeaseTermRule, ProfileKind, RAW_DATE_SUFFIX,
    VarianceRule, enrich,
};
pub use error::{Result, TransformError};
pub use flatten::{PATH_SEPARATOR, flatten_record, flatten_records, nest};
pub use normalization::datetime::{parse_cell, parse_datetime};
