//! Error types for the gridlens library.

use thiserror::Error;

use crate::pivot::ConfigError;

/// Main error type for gridlens operations.
///
/// Data-driven anomalies (blank cells, missing fields, divide-by-zero) never
/// surface here; they degrade to blank values instead.
#[derive(Debug, Error)]
pub enum GridLensError {
    /// Error parsing delimited text data.
    #[error("Parse error at row {row}, column {column}: {message}")]
    Parse {
        row: usize,
        column: usize,
        message: String,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid delimiter detected or specified.
    #[error("Invalid delimiter: {0}")]
    InvalidDelimiter(String),

    /// Empty input or no data rows.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Pivot configuration rejected by validation.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Saving or restoring a persisted layout failed.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error while reading input.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for gridlens operations.
pub type Result<T> = std::result::Result<T, GridLensError>;
