//! In-memory store for testing.

use crate::error::{StorageError, StorageResult};
use crate::image::StoreImage;
use crate::store::KvStore;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Default)]
struct State {
    closed: bool,
    metadata: BTreeMap<String, String>,
    records: BTreeMap<String, String>,
}

/// An in-memory key-value store.
///
/// This store keeps all records in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Scratch stores used while bundling word lists
///
/// # Thread Safety
///
/// This store is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use userdb_storage::{KvStore, InMemoryStore};
///
/// let mut store = InMemoryStore::new("test");
/// store.meta_update("/tick", "3").unwrap();
/// assert_eq!(store.meta_fetch("/tick").unwrap().as_deref(), Some("3"));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    name: String,
    state: RwLock<State>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: RwLock::new(State::default()),
        }
    }

    /// Creates a new in-memory store pre-loaded with records.
    ///
    /// Useful for setting up merge scenarios.
    #[must_use]
    pub fn with_records<I, K, V>(name: impl Into<String>, records: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new(name);
        store.state.write().records = records
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        store
    }

    /// Returns the number of records held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    /// Returns true if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().records.is_empty()
    }

    /// Closes the store. Every later operation fails with `Closed`.
    pub fn close(&mut self) {
        self.state.write().closed = true;
    }

    /// Returns a snapshot of the whole store.
    #[must_use]
    pub fn image(&self) -> StoreImage {
        let state = self.state.read();
        StoreImage::new(state.metadata.clone(), state.records.clone())
    }

    fn ensure_open(state: &State) -> StorageResult<()> {
        if state.closed {
            Err(StorageError::Closed)
        } else {
            Ok(())
        }
    }
}

impl KvStore for InMemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_open(&self) -> bool {
        !self.state.read().closed
    }

    fn fetch(&self, key: &str) -> StorageResult<Option<String>> {
        let state = self.state.read();
        Self::ensure_open(&state)?;
        Ok(state.records.get(key).cloned())
    }

    fn update(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let mut state = self.state.write();
        Self::ensure_open(&state)?;
        state.records.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn meta_fetch(&self, key: &str) -> StorageResult<Option<String>> {
        let state = self.state.read();
        Self::ensure_open(&state)?;
        Ok(state.metadata.get(key).cloned())
    }

    fn meta_update(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let mut state = self.state.write();
        Self::ensure_open(&state)?;
        state.metadata.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn entries(&self) -> StorageResult<Vec<(String, String)>> {
        let state = self.state.read();
        Self::ensure_open(&state)?;
        Ok(state
            .records
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn meta_entries(&self) -> StorageResult<Vec<(String, String)>> {
        let state = self.state.read();
        Self::ensure_open(&state)?;
        Ok(state
            .metadata
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn backup(&self, path: &Path) -> StorageResult<()> {
        Self::ensure_open(&self.state.read())?;
        self.image().write_to(path)
    }

    fn restore(&mut self, path: &Path) -> StorageResult<()> {
        let image = StoreImage::read_from(path)?;
        let mut state = self.state.write();
        Self::ensure_open(&state)?;
        state.metadata.extend(image.metadata);
        state.records.extend(image.records);
        Ok(())
    }
}
