//! Warehouse access for the ETL.
//!
//! - **warehouse**: the [`Warehouse`] and [`LoadJob`] traits
//! - **query**: the single supported key query shape
//! - **diff**: filtering rows already present in the target table
//! - **loader**: final type normalization and append-only loads
//! - **local** / **memory**: file-backed and in-memory backends

pub mod diff;
pub mod error;
pub mod loader;
pub mod local;
pub mod memory;
pub mod query;
pub mod warehouse;

pub use diff::{existing_keys, filter_new_rows};
pub use error::{Result, WarehouseError};
pub use loader::{LoadReport, finalize_types, load_dataset};
pub use local::LocalWarehouse;
pub use memory::MemoryWarehouse;
pub use query::KeyQuery;
pub use warehouse::{JobOutcome, LoadJob, Warehouse};
