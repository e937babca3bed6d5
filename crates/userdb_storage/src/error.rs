//! Error types for store operations.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The store image is corrupted.
    #[error("store corrupted: {0}")]
    Corrupted(String),

    /// The store is closed, or was never bound to a backing map.
    #[error("store is closed")]
    Closed,

    /// Another process holds the store file.
    #[error("store locked: another process has exclusive access to {0}")]
    Locked(String),

    /// Encoding the store image failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}
