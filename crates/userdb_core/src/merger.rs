//! Two-replica merge.
//!
//! A [`Merger`] folds a foreign replica's record stream into a local store.
//! Both sides are first aged to their own store clock, then combined:
//!
//! - commits: the side with the strictly larger magnitude wins; on a tie
//!   the local value stays, including its deletion flag
//! - weight: the larger of the two
//! - tick: `max(our_tick, their_tick)`, the same for every touched record
//!
//! The local clock is advanced once, when the session closes. Record
//! writes are not transactional as a group: each one commits on its own,
//! and a failure to advance the clock does not undo them.
//!
//! ```rust
//! use userdb_core::{Merger, RecordSink, UserDbConfig};
//! use userdb_storage::{InMemoryStore, KvStore};
//!
//! let mut store = InMemoryStore::new("luna_pinyin");
//! let config = UserDbConfig::new().with_user_id("desktop");
//! {
//!     let mut merger = Merger::new(&mut store, &config);
//!     merger.meta_put("/tick", "5").unwrap();
//!     merger.put("ni hao \t你好", "c=2 d=1 t=5").unwrap();
//!     merger.close().unwrap();
//! }
//! assert_eq!(store.meta_fetch("/tick").unwrap().as_deref(), Some("5"));
//! ```

use crate::config::UserDbConfig;
use crate::decay::Decay;
use crate::error::{SyncError, SyncResult};
use crate::metadata::{tick_count, TICK_KEY, USER_ID_KEY};
use crate::sink::RecordSink;
use std::sync::Arc;
use tracing::{debug, error, info};
use userdb_codec::{Record, Tick};
use userdb_storage::{KvStore, StorageError};

/// A merge session writing into one local store.
///
/// Dropping the session closes it; call [`Merger::close`] to observe the
/// result of advancing the clock.
pub struct Merger<'a, S: KvStore + ?Sized> {
    store: &'a mut S,
    decay: Arc<dyn Decay>,
    user_id: String,
    our_tick: Tick,
    their_tick: Tick,
    max_tick: Tick,
    merged_count: usize,
    closed: bool,
}

impl<'a, S: KvStore + ?Sized> Merger<'a, S> {
    /// Starts a session on `store`, reading its clock once.
    pub fn new(store: &'a mut S, config: &UserDbConfig) -> Self {
        Self::with_decay(store, config.decay(), config.user_id.clone())
    }

    /// Starts a session with an explicit decay strategy and local identity.
    pub fn with_decay(store: &'a mut S, decay: Arc<dyn Decay>, user_id: impl Into<String>) -> Self {
        let our_tick = tick_count(&*store);
        Self {
            store,
            decay,
            user_id: user_id.into(),
            our_tick,
            their_tick: 0,
            max_tick: our_tick,
            merged_count: 0,
            closed: false,
        }
    }

    /// Clock of the local store at session start.
    pub fn our_tick(&self) -> Tick {
        self.our_tick
    }

    /// Last clock value announced by the foreign replica.
    pub fn their_tick(&self) -> Tick {
        self.their_tick
    }

    /// Tick stamped on merged records.
    pub fn max_tick(&self) -> Tick {
        self.max_tick
    }

    /// Records merged since the session started or last closed.
    pub fn merged_count(&self) -> usize {
        self.merged_count
    }

    /// Writes the new clock and local identity if anything was merged.
    ///
    /// Runs at most once; later calls, including the one made on drop,
    /// do nothing.
    ///
    /// # Errors
    ///
    /// Returns the store error if the metadata cannot be written. Records
    /// already merged stay in place.
    pub fn close(&mut self) -> SyncResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if self.merged_count == 0 {
            return Ok(());
        }

        self.store
            .meta_update(TICK_KEY, &self.max_tick.to_string())
            .and_then(|()| self.store.meta_update(USER_ID_KEY, &self.user_id))
            .map_err(|e| {
                error!("failed to update tick count: {}", e);
                SyncError::from(e)
            })?;

        info!(
            "total {} entries merged, tick = {}",
            self.merged_count, self.max_tick
        );
        self.merged_count = 0;
        Ok(())
    }

    fn ensure_active(&self) -> SyncResult<()> {
        if self.closed {
            return Err(SyncError::SessionClosed);
        }
        if !self.store.is_open() {
            return Err(StorageError::Closed.into());
        }
        Ok(())
    }
}

impl<S: KvStore + ?Sized> RecordSink for Merger<'_, S> {
    /// Tracks the foreign clock; every other key is accepted and ignored.
    fn meta_put(&mut self, key: &str, value: &str) -> SyncResult<()> {
        if key == TICK_KEY {
            match value.trim().parse::<Tick>() {
                Ok(tick) => {
                    self.their_tick = tick;
                    self.max_tick = self.our_tick.max(tick);
                }
                Err(_) => debug!("ignoring unparseable remote tick '{}'", value),
            }
        }
        Ok(())
    }

    fn put(&mut self, key: &str, value: &str) -> SyncResult<()> {
        self.ensure_active()?;

        let mut theirs = Record::decode_or_default(value);
        if theirs.tick < self.their_tick {
            theirs.weight = self
                .decay
                .decay(0.0, self.their_tick, theirs.weight, theirs.tick);
        }

        let mut ours = match self.store.fetch(key)? {
            Some(existing) => Record::decode_or_default(&existing),
            None => Record::default(),
        };
        if ours.tick < self.our_tick {
            ours.weight = self
                .decay
                .decay(0.0, self.our_tick, ours.weight, ours.tick);
        }

        let commits = if theirs.commits.magnitude() > ours.commits.magnitude() {
            theirs.commits
        } else {
            ours.commits
        };
        let merged = Record::new(commits, ours.weight.max(theirs.weight), self.max_tick);

        self.store.update(key, &merged.encode())?;
        self.merged_count += 1;
        Ok(())
    }
}

impl<S: KvStore + ?Sized> Drop for Merger<'_, S> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            error!("merge session closed with error: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decay::NoDecay;
    use userdb_codec::Commits;
    use userdb_storage::InMemoryStore;

    /// Store whose metadata writes always fail.
    struct ReadOnlyMeta {
        inner: InMemoryStore,
        meta_writes: usize,
    }

    impl KvStore for ReadOnlyMeta {
        fn name(&self) -> &str {
            self.inner.name()
        }
        fn is_open(&self) -> bool {
            self.inner.is_open()
        }
        fn fetch(&self, key: &str) -> userdb_storage::StorageResult<Option<String>> {
            self.inner.fetch(key)
        }
        fn update(&mut self, key: &str, value: &str) -> userdb_storage::StorageResult<()> {
            self.inner.update(key, value)
        }
        fn meta_fetch(&self, key: &str) -> userdb_storage::StorageResult<Option<String>> {
            self.inner.meta_fetch(key)
        }
        fn meta_update(&mut self, _key: &str, _value: &str) -> userdb_storage::StorageResult<()> {
            self.meta_writes += 1;
            Err(StorageError::Corrupted("metadata is read-only".into()))
        }
        fn entries(&self) -> userdb_storage::StorageResult<Vec<(String, String)>> {
            self.inner.entries()
        }
        fn meta_entries(&self) -> userdb_storage::StorageResult<Vec<(String, String)>> {
            self.inner.meta_entries()
        }
        fn backup(&self, path: &std::path::Path) -> userdb_storage::StorageResult<()> {
            self.inner.backup(path)
        }
        fn restore(&mut self, path: &std::path::Path) -> userdb_storage::StorageResult<()> {
            self.inner.restore(path)
        }
    }

    fn merger(store: &mut InMemoryStore) -> Merger<'_, InMemoryStore> {
        Merger::with_decay(store, Arc::new(NoDecay), "local")
    }

    fn record(store: &InMemoryStore, key: &str) -> Record {
        Record::decode(&store.fetch(key).unwrap().unwrap()).unwrap()
    }

    #[test]
    fn larger_magnitude_wins_and_weight_is_max() {
        let mut store = InMemoryStore::with_records("t", [("k", "c=5 d=0.2 t=1")]);
        store.meta_update(TICK_KEY, "1").unwrap();
        {
            let mut m = merger(&mut store);
            m.meta_put(TICK_KEY, "1").unwrap();
            m.put("k", "c=3 d=0.5 t=1").unwrap();
        }
        assert_eq!(record(&store, "k"), Record::new(Commits::active(5), 0.5, 1));
    }

    #[test]
    fn incoming_larger_magnitude_replaces_sign() {
        let mut store = InMemoryStore::with_records("t", [("k", "c=2 d=1 t=1")]);
        {
            let mut m = merger(&mut store);
            m.put("k", "c=-4 d=0 t=1").unwrap();
        }
        assert_eq!(record(&store, "k").commits, Commits::tombstone(4));
    }

    #[test]
    fn equal_magnitude_keeps_local() {
        let mut store = InMemoryStore::with_records("t", [("k", "c=5 d=1 t=1")]);
        {
            let mut m = merger(&mut store);
            m.put("k", "c=-5 d=1 t=1").unwrap();
        }
        assert_eq!(record(&store, "k").commits, Commits::active(5));
    }

    #[test]
    fn tick_tracking() {
        let mut store = InMemoryStore::new("t");
        store.meta_update(TICK_KEY, "10").unwrap();
        let mut m = merger(&mut store);

        assert_eq!(m.our_tick(), 10);
        assert_eq!(m.their_tick(), 0);
        assert_eq!(m.max_tick(), 10);

        m.meta_put(TICK_KEY, "7").unwrap();
        assert_eq!(m.their_tick(), 7);
        assert_eq!(m.max_tick(), 10);

        m.meta_put(TICK_KEY, "25").unwrap();
        assert_eq!(m.max_tick(), 25);

        m.meta_put(TICK_KEY, "garbage").unwrap();
        assert_eq!(m.their_tick(), 25);
        m.meta_put("/user_id", "remote").unwrap();
    }

    #[test]
    fn merged_records_carry_max_tick() {
        let mut store = InMemoryStore::with_records("t", [("a", "c=1 d=1 t=3")]);
        store.meta_update(TICK_KEY, "4").unwrap();
        {
            let mut m = merger(&mut store);
            m.meta_put(TICK_KEY, "9").unwrap();
            m.put("a", "c=1 d=1 t=2").unwrap();
            m.put("b", "c=1 d=1 t=9").unwrap();
            m.close().unwrap();
        }
        assert_eq!(record(&store, "a").tick, 9);
        assert_eq!(record(&store, "b").tick, 9);
        assert_eq!(store.meta_fetch(TICK_KEY).unwrap().as_deref(), Some("9"));
        assert_eq!(store.meta_fetch(USER_ID_KEY).unwrap().as_deref(), Some("local"));
    }

    #[test]
    fn stale_weights_decay_before_compare() {
        // halves weight once per elapsed tick
        let halving = |_o: f64, t: Tick, w: f64, rt: Tick| w / 2f64.powi((t - rt) as i32);
        let mut store = InMemoryStore::with_records("t", [("k", "c=1 d=8 t=1")]);
        store.meta_update(TICK_KEY, "3").unwrap();
        {
            let mut m = Merger::with_decay(&mut store, Arc::new(halving), "local");
            m.meta_put(TICK_KEY, "2").unwrap();
            // theirs: 4 at t=1, remote clock 2 -> 2; ours: 8 at t=1, local clock 3 -> 2
            m.put("k", "c=1 d=4 t=1").unwrap();
        }
        let merged = record(&store, "k");
        assert_eq!(merged.weight, 2.0);
        assert_eq!(merged.tick, 3);
    }

    #[test]
    fn close_on_empty_writes_nothing() {
        let mut store = InMemoryStore::new("t");
        {
            let mut m = merger(&mut store);
            m.meta_put(TICK_KEY, "50").unwrap();
            m.close().unwrap();
        }
        assert!(store.meta_entries().unwrap().is_empty());
    }

    #[test]
    fn drop_closes_session() {
        let mut store = InMemoryStore::new("t");
        {
            let mut m = merger(&mut store);
            m.meta_put(TICK_KEY, "6").unwrap();
            m.put("k", "c=1 d=1 t=6").unwrap();
        }
        assert_eq!(store.meta_fetch(TICK_KEY).unwrap().as_deref(), Some("6"));
    }

    #[test]
    fn failed_close_keeps_records_and_runs_once() {
        let mut store = ReadOnlyMeta {
            inner: InMemoryStore::new("t"),
            meta_writes: 0,
        };
        {
            let mut m = Merger::with_decay(&mut store, Arc::new(NoDecay), "local");
            m.meta_put(TICK_KEY, "3").unwrap();
            m.put("k", "c=1 d=1 t=3").unwrap();
            assert!(matches!(m.close(), Err(SyncError::Store(_))));
            assert!(m.close().is_ok());
        }
        assert_eq!(store.meta_writes, 1);
        assert_eq!(
            store.inner.fetch("k").unwrap().as_deref(),
            Some("c=1 d=1 t=3")
        );
    }

    #[test]
    fn closed_session_rejects_records() {
        let mut store = InMemoryStore::new("t");
        let mut m = merger(&mut store);
        m.close().unwrap();
        assert!(matches!(m.put("k", "c=1"), Err(SyncError::SessionClosed)));
    }

    #[test]
    fn closed_store_fails_immediately() {
        let mut store = InMemoryStore::new("t");
        store.close();
        let mut m = merger(&mut store);
        let err = m.put("k", "c=1").unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(m.merged_count(), 0);
    }

    #[test]
    fn undecodable_incoming_counts_as_zero() {
        let mut store = InMemoryStore::with_records("t", [("k", "c=1 d=1 t=1")]);
        store.meta_update(TICK_KEY, "1").unwrap();
        {
            let mut m = merger(&mut store);
            m.meta_put(TICK_KEY, "4").unwrap();
            m.put("k", "c=5 d=abc t=1").unwrap();
            assert_eq!(m.merged_count(), 1);
        }
        // local value survives, restamped with the session tick
        assert_eq!(record(&store, "k"), Record::new(Commits::active(1), 1.0, 4));
    }

    #[test]
    fn corrupt_existing_value_counts_as_zero() {
        let mut store = InMemoryStore::with_records("t", [("k", "c=?? d=9")]);
        {
            let mut m = merger(&mut store);
            m.put("k", "c=1 d=0.5 t=1").unwrap();
        }
        assert_eq!(record(&store, "k"), Record::new(Commits::active(1), 0.5, 1));
    }

    #[test]
    fn remerge_is_idempotent() {
        let stream = [("a", "c=3 d=2 t=4"), ("b", "c=-2 d=1 t=2"), ("c", "c=1 d=7 t=5")];
        let base = [("a", "c=1 d=5 t=3"), ("b", "c=1 d=1 t=3")];

        let run = |times: usize| {
            let mut store = InMemoryStore::with_records("t", base);
            store.meta_update(TICK_KEY, "3").unwrap();
            for _ in 0..times {
                let mut m = merger(&mut store);
                m.meta_put(TICK_KEY, "5").unwrap();
                for (k, v) in stream {
                    m.put(k, v).unwrap();
                }
            }
            store.image()
        };

        assert_eq!(run(1), run(2));
    }
}
