//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while decoding a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A recognized field held a value of the wrong numeric type.
    #[error("invalid value for field '{key}': '{value}'")]
    InvalidField {
        /// The field key (`c`, `d` or `t`).
        key: String,
        /// The raw value that failed to parse.
        value: String,
    },
}

impl CodecError {
    /// Create an invalid field error.
    pub fn invalid_field(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidField {
            key: key.into(),
            value: value.into(),
        }
    }
}
