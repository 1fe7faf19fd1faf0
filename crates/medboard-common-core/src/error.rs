//! Error types for Medboard.

use thiserror::Error;

/// The main error type for Medboard operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error with custom message.
    #[error("{0}")]
    Generic(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Data store error, carrying the envelope message.
    #[error("store error: {0}")]
    Store(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new generic error.
    pub fn new(msg: impl Into<String>) -> Self {
        Self::Generic(msg.into())
    }

    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new store error.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}

/// Result type alias using Medboard's Error.
pub type Result<T> = std::result::Result<T, Error>;
