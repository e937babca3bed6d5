//! Error types for merge, import and snapshot operations.

use std::io;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while feeding records into a store.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Store error while reading or writing a record.
    #[error("store error: {0}")]
    Store(#[from] userdb_storage::StorageError),

    /// An incoming record could not be decoded.
    #[error("codec error: {0}")]
    Codec(#[from] userdb_codec::CodecError),

    /// I/O error on a snapshot file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A snapshot file could not be read.
    #[error("snapshot stream error at line {line}: {message}")]
    Stream {
        /// 1-based line number.
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// The merge session was already closed.
    #[error("merge session already closed")]
    SessionClosed,

    /// The store is not a user dictionary.
    #[error("not a user dictionary: {0}")]
    NotUserDb(String),
}

impl SyncError {
    /// Creates a stream error.
    pub fn stream(line: usize, message: impl Into<String>) -> Self {
        Self::Stream {
            line,
            message: message.into(),
        }
    }

    /// Returns true if the error ends the whole session regardless of the
    /// driver's error policy.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SyncError::Store(userdb_storage::StorageError::Closed)
                | SyncError::Io(_)
                | SyncError::Stream { .. }
                | SyncError::SessionClosed
        )
    }
}
