//! Error types for the roster pipeline

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Shared error type for the store, crawl, and search layers
#[derive(Error, Debug)]
pub enum Error {
    /// Durable store errors (SQLite open, schema, read/write)
    #[error("Store error: {0}")]
    Store(String),

    /// Store held by another writer past the retry budget
    #[error("Store busy: {0}")]
    StoreBusy(String),

    /// Checkpoint file errors (unreadable, unparseable, regressing)
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    /// Remote endpoint configuration errors (bad base URL, client build)
    #[error("Client error: {0}")]
    Client(String),

    /// Directory index build or query errors
    #[error("Search error: {0}")]
    Search(String),

    /// Invalid ID range or batch configuration
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// JSON parsing error (serde_json)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        Error::Store(msg.into())
    }

    /// Create a store-busy error
    pub fn store_busy(msg: impl Into<String>) -> Self {
        Error::StoreBusy(msg.into())
    }

    /// Create a checkpoint error
    pub fn checkpoint(msg: impl Into<String>) -> Self {
        Error::Checkpoint(msg.into())
    }

    /// Create a client configuration error
    pub fn client(msg: impl Into<String>) -> Self {
        Error::Client(msg.into())
    }

    /// Create a search error
    pub fn search(msg: impl Into<String>) -> Self {
        Error::Search(msg.into())
    }

    /// Create an invalid range error
    pub fn invalid_range(msg: impl Into<String>) -> Self {
        Error::InvalidRange(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}
