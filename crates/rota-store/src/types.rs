// Store error types shared by every repository implementation.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("operation failed: {0}")]
    OperationFailed(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to decode stored record: {0}")]
    Decoding(String),

    #[error("failed to encode record: {0}")]
    Encoding(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
