use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid object id '{value}': {reason}")]
    InvalidObjectId { value: String, reason: String },
    #[error("invalid table identifier '{value}': expected project.dataset.table")]
    InvalidTableId { value: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
