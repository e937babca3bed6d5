//! Snapshot backup and restore.
//!
//! A snapshot file's suffix picks its format through a
//! [`FormatRegistry`]: plain text files go through the row codec in this
//! module, anything else is handed to the store's native backup.
//!
//! ## Usage
//!
//! ```ignore
//! use userdb_core::snapshot::{backup, restore};
//!
//! let registry = config.format_registry();
//! backup(&store, Path::new("luna_pinyin.userdb.txt"), &registry)?;
//! restore(&mut other, Path::new("luna_pinyin.userdb.txt"), &registry, ErrorPolicy::Abort)?;
//! ```

mod format;
mod tsv;

pub use format::{
    format_userdb_row, parse_userdb_row, FormatRegistry, RowFormat, RowFormatter, RowParser,
    SnapshotFormat, PLAIN_SNAPSHOT_SUFFIX, PLAIN_USERDB_FORMAT,
};
pub use tsv::{TsvReader, TsvWriter};

use crate::config::ErrorPolicy;
use crate::error::{SyncError, SyncResult};
use crate::sink::{RecordSink, StoreSink, TransferStats};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::{error, info};
use userdb_storage::KvStore;

/// Writes `store` to `snapshot_file` in the format its suffix selects.
///
/// A failed write may leave a partial file behind.
///
/// # Errors
///
/// Fails if the store cannot be read or the file cannot be written.
pub fn backup<S: KvStore + ?Sized>(
    store: &S,
    snapshot_file: &Path,
    registry: &FormatRegistry,
) -> SyncResult<TransferStats> {
    match registry.resolve(snapshot_file) {
        SnapshotFormat::PlainText => {
            info!(
                "backing up db '{}' to {}",
                store.name(),
                snapshot_file.display()
            );
            let file = File::create(snapshot_file)?;
            let mut writer = TsvWriter::new(BufWriter::new(file), PLAIN_USERDB_FORMAT);
            writer.write_from(store).inspect_err(|e| error!("{}", e))
        }
        SnapshotFormat::Native => {
            store.backup(snapshot_file)?;
            Ok(TransferStats::default())
        }
    }
}

/// Loads `snapshot_file` into `store`, overwriting values key by key.
///
/// # Errors
///
/// Fails if the file cannot be read or the store refuses a write the
/// policy does not tolerate.
pub fn restore<S: KvStore + ?Sized>(
    store: &mut S,
    snapshot_file: &Path,
    registry: &FormatRegistry,
    policy: ErrorPolicy,
) -> SyncResult<TransferStats> {
    match registry.resolve(snapshot_file) {
        SnapshotFormat::PlainText => {
            info!(
                "restoring db '{}' from {}",
                store.name(),
                snapshot_file.display()
            );
            let mut sink = StoreSink::new(store);
            read_plain(snapshot_file, &mut sink, policy)
        }
        SnapshotFormat::Native => {
            store.restore(snapshot_file)?;
            Ok(TransferStats::default())
        }
    }
}

/// Streams a plain text snapshot into any sink (merger, importer, store).
///
/// # Errors
///
/// Fails if the file cannot be opened or read, or the sink fails in a way
/// the policy does not tolerate.
pub fn read_plain<K: RecordSink + ?Sized>(
    snapshot_file: &Path,
    sink: &mut K,
    policy: ErrorPolicy,
) -> SyncResult<TransferStats> {
    let file = File::open(snapshot_file)?;
    TsvReader::new(BufReader::new(file), PLAIN_USERDB_FORMAT)
        .with_error_policy(policy)
        .read_into(sink)
        .inspect_err(|e: &SyncError| error!("{}", e))
}
