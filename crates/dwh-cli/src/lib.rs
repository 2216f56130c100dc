//! Library side of the `dwh-etl` binary.

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod types;
