//! Key/value store read errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading a llama-stack key/value database
///
/// These never abort a run; the display text is attached to the report.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid chunk index '{key}': expected an integer")]
    InvalidChunkIndex { key: String },
}
