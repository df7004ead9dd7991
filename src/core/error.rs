//! Error types for the API hook.
//!
//! The logging pipeline itself never fails; these errors only surface from
//! parsing configuration text or caller-supplied tags.

use thiserror::Error;

/// Result type alias for API hook operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in API hook operations.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    // Tag parsing errors
    #[error("Unknown event severity: {0}")]
    InvalidSeverity(String),

    #[error("Unknown call outcome: {0}")]
    InvalidOutcome(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}
