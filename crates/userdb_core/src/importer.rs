//! One-way absorb of timeless records.
//!
//! Used for word lists bundled into a live store. Incoming records carry
//! no usable clock, so nothing is aged and the store clock is left alone.

use crate::error::{SyncError, SyncResult};
use crate::sink::RecordSink;
use userdb_codec::{Commits, Record};
use userdb_storage::{KvStore, StorageError};

/// An absorb session writing into one local store.
pub struct Importer<'a, S: KvStore + ?Sized> {
    store: &'a mut S,
    imported_count: usize,
}

impl<'a, S: KvStore + ?Sized> Importer<'a, S> {
    /// Starts a session on `store`.
    pub fn new(store: &'a mut S) -> Self {
        Self {
            store,
            imported_count: 0,
        }
    }

    /// Records written so far.
    pub fn imported_count(&self) -> usize {
        self.imported_count
    }
}

/// Folds `incoming` into `existing`.
///
/// A positive count raises both count and weight; a tombstone marks the
/// entry deleted while keeping the larger of the two magnitudes; zero
/// changes nothing. The tick is never touched.
pub fn absorb(existing: Record, incoming: Record) -> Record {
    let mut out = existing;
    let raw = incoming.commits.to_raw();
    if raw > 0 {
        out.commits = Commits::from_raw(existing.commits.to_raw().max(raw));
        out.weight = existing.weight.max(incoming.weight);
    } else if raw < 0 {
        out.commits = Commits::tombstone(
            existing
                .commits
                .magnitude()
                .max(incoming.commits.magnitude()),
        );
    }
    out
}

impl<S: KvStore + ?Sized> RecordSink for Importer<'_, S> {
    fn meta_put(&mut self, _key: &str, _value: &str) -> SyncResult<()> {
        Ok(())
    }

    /// Always writes the result back, even when nothing changed.
    fn put(&mut self, key: &str, value: &str) -> SyncResult<()> {
        if !self.store.is_open() {
            return Err(SyncError::Store(StorageError::Closed));
        }
        let incoming = Record::decode_or_default(value);
        let existing = match self.store.fetch(key)? {
            Some(old) => Record::decode_or_default(&old),
            None => Record::default(),
        };
        self.store.update(key, &absorb(existing, incoming).encode())?;
        self.imported_count += 1;
        Ok(())
    }
}
