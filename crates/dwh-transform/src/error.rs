use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransformError {
    /// A business amount that must be numeric is not.
    #[error("column '{column}' row {row}: value '{value}' is not numeric")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, TransformError>;
