//! Key-value store trait definition.

use crate::error::StorageResult;
use std::path::Path;

/// A key-value store holding encoded UserDB records.
///
/// Stores are **opaque string maps**. Keys and values are stored exactly
/// as given; callers own all interpretation of their content.
///
/// # Invariants
///
/// - `fetch` returns exactly the value last written by `update` for that key
/// - `meta_fetch` returns exactly the value last written by `meta_update`
/// - Records are never removed through this interface
/// - A closed store fails every operation with [`crate::StorageError::Closed`]
///
/// # Implementors
///
/// - [`super::InMemoryStore`] - For testing
/// - [`super::FileStore`] - For persistent storage
pub trait KvStore: Send + Sync {
    /// Returns the store name (usually the dictionary name).
    fn name(&self) -> &str;

    /// Returns true while the store accepts reads and writes.
    fn is_open(&self) -> bool;

    /// Reads the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or the read fails.
    fn fetch(&self, key: &str) -> StorageResult<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or the write fails.
    fn update(&mut self, key: &str, value: &str) -> StorageResult<()>;

    /// Reads a metadata value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or the read fails.
    fn meta_fetch(&self, key: &str) -> StorageResult<Option<String>>;

    /// Writes a metadata value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or the write fails.
    fn meta_update(&mut self, key: &str, value: &str) -> StorageResult<()>;

    /// Returns all records in key order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed.
    fn entries(&self) -> StorageResult<Vec<(String, String)>>;

    /// Returns all metadata pairs in key order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed.
    fn meta_entries(&self) -> StorageResult<Vec<(String, String)>>;

    /// Writes the store's native backup image to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or the image cannot be written.
    fn backup(&self, path: &Path) -> StorageResult<()>;

    /// Loads a native backup image from `path` into this store.
    ///
    /// Every record and metadata pair in the image overwrites the value
    /// under the same key; keys absent from the image are left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or the image is unreadable.
    fn restore(&mut self, path: &Path) -> StorageResult<()>;
}
