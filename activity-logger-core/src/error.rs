//! Error types for activity-logger.

use thiserror::Error;

/// Errors that can occur in activity-logger operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Identity provider error: {0}")]
    Identity(String),

    #[error("Calendar service error: {0}")]
    Calendar(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for activity-logger operations.
pub type Result<T> = std::result::Result<T, Error>;
