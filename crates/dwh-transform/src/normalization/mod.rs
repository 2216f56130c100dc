//! Normalization functions for extracted values.
//!
//! - **datetime**: locale-agnostic date/time parsing
//! - **duration**: whole-day spans between timestamps
//! - **numeric**: numeric parsing shared by coercion and enrichment

pub mod datetime;
pub mod duration;
pub mod numeric;

pub use datetime::{parse_cell, parse_datetime};
pub use duration::whole_days_between;
pub use numeric::{Numeric, format_numeric, numeric_value, parse_f64};
