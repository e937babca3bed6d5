//! Record streams.
//!
//! Every session consumes the same stream shape: metadata pairs followed
//! by `(key, encoded value)` records, one at a time. Sources are another
//! store ([`pump`]) or a text snapshot ([`crate::snapshot::TsvReader`]);
//! sinks are the [`crate::Merger`], the [`crate::Importer`] and the plain
//! [`StoreSink`].

use crate::config::ErrorPolicy;
use crate::error::SyncResult;
use tracing::warn;
use userdb_storage::KvStore;

/// Receiver of a record stream.
pub trait RecordSink {
    /// Receives one metadata pair.
    fn meta_put(&mut self, key: &str, value: &str) -> SyncResult<()>;

    /// Receives one record.
    fn put(&mut self, key: &str, value: &str) -> SyncResult<()>;
}

/// Counters reported by stream drivers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferStats {
    /// Metadata pairs delivered.
    pub metadata: usize,
    /// Records delivered and accepted.
    pub records: usize,
    /// Records the sink refused.
    pub failed: usize,
    /// Rows skipped as malformed before reaching the sink.
    pub skipped: usize,
}

impl TransferStats {
    /// Feeds one record to `sink`, applying `policy` to a failure.
    pub(crate) fn deliver<K: RecordSink + ?Sized>(
        &mut self,
        sink: &mut K,
        key: &str,
        value: &str,
        policy: ErrorPolicy,
    ) -> SyncResult<()> {
        match sink.put(key, value) {
            Ok(()) => {
                self.records += 1;
                Ok(())
            }
            Err(e) if e.is_fatal() || policy == ErrorPolicy::Abort => Err(e),
            Err(e) => {
                warn!("failed to apply record '{}': {}", key, e);
                self.failed += 1;
                Ok(())
            }
        }
    }
}

/// Writes the stream straight into a store, overwriting existing values.
///
/// This is what a restore does: no merging, metadata copied as is.
pub struct StoreSink<'a, S: KvStore + ?Sized> {
    store: &'a mut S,
}

impl<'a, S: KvStore + ?Sized> StoreSink<'a, S> {
    /// Wraps a store.
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }
}

impl<S: KvStore + ?Sized> RecordSink for StoreSink<'_, S> {
    fn meta_put(&mut self, key: &str, value: &str) -> SyncResult<()> {
        self.store.meta_update(key, value)?;
        Ok(())
    }

    fn put(&mut self, key: &str, value: &str) -> SyncResult<()> {
        self.store.update(key, value)?;
        Ok(())
    }
}

/// Streams all metadata, then all records, of `source` into `sink`.
///
/// # Errors
///
/// Fails if `source` cannot be read, if a metadata pair is refused, or if
/// a record fails under [`ErrorPolicy::Abort`] or with a fatal error.
pub fn pump<S, K>(source: &S, sink: &mut K, policy: ErrorPolicy) -> SyncResult<TransferStats>
where
    S: KvStore + ?Sized,
    K: RecordSink + ?Sized,
{
    let mut stats = TransferStats::default();
    for (key, value) in source.meta_entries()? {
        sink.meta_put(&key, &value)?;
        stats.metadata += 1;
    }
    for (key, value) in source.entries()? {
        stats.deliver(sink, &key, &value, policy)?;
    }
    Ok(stats)
}
