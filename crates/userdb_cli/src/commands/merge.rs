//! Merge and import commands.

use super::{open_existing, open_store};
use std::path::Path;
use tracing::info;
use userdb_core::snapshot::{self, SnapshotFormat};
use userdb_core::{metadata, pump, Importer, Merger, RecordSink, TransferStats, UserDbConfig};

/// Merge another replica into the store.
///
/// The store keeps its recorded `/user_id` unless `user_id` overrides it.
pub fn merge(
    store_path: &Path,
    source_path: &Path,
    config: &UserDbConfig,
    user_id: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Merging {:?} into {:?}", source_path, store_path);

    let mut store = open_store(store_path, config)?;
    let user_id = user_id.map_or_else(|| metadata::user_id(&store), str::to_string);
    let (stats, tick) = {
        let mut merger = Merger::with_decay(&mut store, config.decay(), user_id);
        let stats = feed(source_path, &mut merger, config)?;
        let tick = merger.max_tick();
        merger.close()?;
        (stats, tick)
    };
    store.flush()?;

    println!("✓ Merge completed");
    print_stats(&stats);
    println!("  Tick: {}", tick);

    Ok(())
}

/// Absorb a bundled word list into the store.
pub fn import(
    store_path: &Path,
    source_path: &Path,
    config: &UserDbConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Importing {:?} into {:?}", source_path, store_path);

    let mut store = open_store(store_path, config)?;
    let stats = {
        let mut importer = Importer::new(&mut store);
        feed(source_path, &mut importer, config)?
    };
    store.flush()?;

    println!("✓ Import completed");
    print_stats(&stats);

    Ok(())
}

/// Streams a snapshot file or another store into `sink`.
fn feed<K: RecordSink>(
    source_path: &Path,
    sink: &mut K,
    config: &UserDbConfig,
) -> Result<TransferStats, Box<dyn std::error::Error>> {
    let stats = match config.format_registry().resolve(source_path) {
        SnapshotFormat::PlainText => {
            snapshot::read_plain(source_path, sink, config.on_record_error)?
        }
        SnapshotFormat::Native => {
            let source = open_existing(source_path)?;
            pump(&source, sink, config.on_record_error)?
        }
    };
    Ok(stats)
}

fn print_stats(stats: &TransferStats) {
    println!("  Records applied: {}", stats.records);
    if stats.failed > 0 {
        println!("  Failed records: {}", stats.failed);
    }
    if stats.skipped > 0 {
        println!("  Rejected rows: {}", stats.skipped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use userdb_storage::KvStore;

    #[test]
    fn merge_from_snapshot_advances_tick() {
        let dir = tempdir().unwrap();
        let store_path = dir.path().join("luna.userdb");
        let snapshot_path = dir.path().join("remote.userdb.txt");
        std::fs::write(
            &snapshot_path,
            "# Rime user dictionary\n#@/tick\t12\na \tA\tc=2 d=1 t=12\n",
        )
        .unwrap();

        let config = UserDbConfig::new().with_user_id("desktop");
        merge(&store_path, &snapshot_path, &config, None).unwrap();

        let store = open_existing(&store_path).unwrap();
        assert_eq!(metadata::tick_count(&store), 12);
        assert_eq!(store.fetch("a \tA").unwrap().as_deref(), Some("c=2 d=1 t=12"));
    }

    #[test]
    fn merge_from_store_file() {
        let dir = tempdir().unwrap();
        let local_path = dir.path().join("local.userdb");
        let remote_path = dir.path().join("remote.userdb");
        let config = UserDbConfig::new();

        {
            let mut remote = open_store(&remote_path, &UserDbConfig::new()).unwrap();
            remote.meta_update("/tick", "4").unwrap();
            remote.update("b \tB", "c=1 d=2 t=4").unwrap();
        }

        merge(&local_path, &remote_path, &config, Some("desktop")).unwrap();

        let store = open_existing(&local_path).unwrap();
        assert_eq!(metadata::user_id(&store), "desktop");
        assert_eq!(store.fetch("b \tB").unwrap().as_deref(), Some("c=1 d=2 t=4"));
    }

    #[test]
    fn repeated_merge_keeps_store_identity() {
        let dir = tempdir().unwrap();
        let store_path = dir.path().join("luna.userdb");
        let snapshot_path = dir.path().join("remote.userdb.txt");
        std::fs::write(&snapshot_path, "#@/tick\t3\na \tA\tc=1 d=1 t=3\n").unwrap();

        merge(&store_path, &snapshot_path, &UserDbConfig::new(), None).unwrap();
        let first = metadata::user_id(&open_existing(&store_path).unwrap());
        merge(&store_path, &snapshot_path, &UserDbConfig::new(), None).unwrap();
        let second = metadata::user_id(&open_existing(&store_path).unwrap());

        assert_eq!(first, second);
        assert_ne!(first, "unknown");
    }

    #[test]
    fn import_keeps_tick() {
        let dir = tempdir().unwrap();
        let store_path = dir.path().join("luna.userdb");
        let list_path = dir.path().join("essay.userdb.txt");
        std::fs::write(&list_path, "#@/tick\t100\nni hao\t你好\tc=3 d=2\n").unwrap();

        import(&store_path, &list_path, &UserDbConfig::new()).unwrap();

        let store = open_existing(&store_path).unwrap();
        assert_eq!(metadata::tick_count(&store), 1);
        assert_eq!(
            store.fetch("ni hao \t你好").unwrap().as_deref(),
            Some("c=3 d=2 t=0")
        );
    }
}
