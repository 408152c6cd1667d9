//! Error types for the stratus application.
//!
//! Load-time row problems and per-request validation problems have their own
//! enums (`RowError`, `QueryError`); this module ties them together with the
//! fatal startup and server errors.

use thiserror::Error;

use crate::query::QueryError;

/// The main error type for stratus operations.
#[derive(Error, Debug)]
pub enum StratusError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited-file decoding errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Query validation errors
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Data not found errors
    #[error("Data not found: {message}")]
    DataNotFound { message: String },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server errors
    #[error("Server error: {message}")]
    Server { message: String },
}

/// Convenience type alias for Results with StratusError
pub type Result<T> = std::result::Result<T, StratusError>;
