//! Data model for the document-to-warehouse ETL.
//!
//! - **document**: source records as a tagged value tree
//! - **value**: scalar cells of flattened rows
//! - **dataset**: rows sharing a column set, with column type inference
//! - **table**: `project.dataset.table` identifiers

pub mod dataset;
pub mod document;
pub mod error;
pub mod table;
pub mod value;

pub use dataset::{ColumnType, Dataset, Row};
pub use document::{Document, OBJECT_ID_LEN, ObjectId, Record, format_timestamp};
pub use error::{ModelError, Result};
pub use table::TableId;
pub use value::{CellValue, format_numeric};
