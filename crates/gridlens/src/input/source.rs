//! Metadata about loaded row data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata about parsed source data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// SHA-256 hash of the raw contents.
    pub hash: String,
    /// Detected format (csv, tsv, etc.).
    pub format: String,
    /// Detected encoding.
    pub encoding: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the data was loaded.
    pub loaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for freshly parsed data.
    pub fn new(hash: String, format: impl Into<String>, row_count: usize, column_count: usize) -> Self {
        Self {
            hash,
            format: format.into(),
            encoding: "utf-8".to_string(),
            row_count,
            column_count,
            loaded_at: Utc::now(),
        }
    }
}
