//! Error types for the decision engine
//!
//! Structured errors use thiserror. Most public decision operations never surface
//! these: they degrade to an empty or no-op outcome and log the failure. The
//! `try_*` variants on stores and providers return them for callers that care.

use crate::config::ConfigError;
use std::time::Duration;
use thiserror::Error;

/// Main error type for decision engine operations
#[derive(Error, Debug)]
pub enum DecideError {
    /// Blob store read/write failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Place search or detail provider failed
    #[error("Provider error: {0}")]
    Provider(String),

    /// External call exceeded its time budget
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Input rejected at the boundary (empty name, out-of-range bound)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for decision engine operations
pub type Result<T> = std::result::Result<T, DecideError>;

/// Convert anyhow::Error to DecideError
impl From<anyhow::Error> for DecideError {
    fn from(err: anyhow::Error) -> Self {
        DecideError::Other(err.to_string())
    }
}
