//! Document store access for the ETL.
//!
//! The [`DocumentStore`] trait is the extraction seam. [`JsonExportStore`]
//! reads collection exports from disk and decodes extended JSON wrappers;
//! [`MemoryStore`] serves fixed collections.

pub mod error;
pub mod export;
pub mod extended;
pub mod store;

pub use error::{Result, SourceError};
pub use export::{ExportFormat, JsonExportStore, read_json, read_json_lines};
pub use extended::{document_from_json, record_from_json};
pub use store::{DocumentStore, MemoryStore};
