use std::path::PathBuf;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised while reading or writing a store file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file does not exist and the store does not tolerate that.
    #[error("Store file not found: {}", .0.display())]
    Missing(PathBuf),

    /// The document parsed but the expected top-level key was absent.
    #[error("Store file {} has no `{key}` entry", path.display())]
    MissingKey { path: PathBuf, key: String },

    /// Another process holds the store lock and did not release it in time.
    #[error("Store is in use by another process (lock {})", .0.display())]
    Busy(PathBuf),

    /// A record in the file does not match the expected shape.
    #[error("Invalid record at index {index}{} in {}: {source}", id.as_deref().map(|id| format!(" ({})", id)).unwrap_or_default(), path.display())]
    InvalidRecord {
        path: PathBuf,
        index: usize,
        id: Option<String>,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
