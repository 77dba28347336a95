//! Storage error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StorageError {
    /// Status code reported on the envelope for this error
    pub fn httpcode(&self) -> u16 {
        match self {
            StorageError::NotFound(_) => 404,
            StorageError::InvalidPolicy(_) => 400,
            _ => 500,
        }
    }
}
