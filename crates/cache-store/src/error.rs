//! Error types for the cache store.

use thiserror::Error;

/// Errors that can occur while reading or writing cached entries
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Cached value is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to prepare cache directory {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A stored timestamp could not be converted back to a date
    #[error("Corrupt timestamp {0} in cache entry")]
    Timestamp(i64),

    /// The blocking task running a SQLite call failed or was cancelled
    #[error("Cache task failed: {0}")]
    Task(String),

    #[error("Cache connection lock was poisoned")]
    Poisoned,
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CacheError>;
