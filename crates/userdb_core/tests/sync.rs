//! End-to-end sync scenarios between replicas.

use std::path::Path;
use tempfile::tempdir;
use userdb_codec::{compose_key, Commits, Record};
use userdb_core::metadata::{self, TICK_KEY};
use userdb_core::snapshot::{self, SnapshotFormat};
use userdb_core::{pump, ErrorPolicy, Importer, Merger, UserDbConfig};
use userdb_storage::{FileStore, InMemoryStore, KvStore};

fn device(name: &str, config: &UserDbConfig, tick: u64) -> InMemoryStore {
    let mut store = InMemoryStore::new(name);
    metadata::create_metadata(&mut store, config).unwrap();
    store.meta_update(TICK_KEY, &tick.to_string()).unwrap();
    store
}

fn put(store: &mut InMemoryStore, code: &str, phrase: &str, record: Record) {
    store
        .update(&compose_key(code, phrase), &record.encode())
        .unwrap();
}

fn get(store: &InMemoryStore, code: &str, phrase: &str) -> Record {
    let value = store.fetch(&compose_key(code, phrase)).unwrap().unwrap();
    Record::decode(&value).unwrap()
}

fn merge_snapshot(store: &mut InMemoryStore, path: &Path, config: &UserDbConfig) {
    let mut merger = Merger::new(store, config);
    snapshot::read_plain(path, &mut merger, ErrorPolicy::Abort).unwrap();
    merger.close().unwrap();
}

#[test]
fn two_devices_converge_through_text_snapshots() {
    let dir = tempdir().unwrap();
    let desktop_cfg = UserDbConfig::new().with_user_id("desktop");
    let laptop_cfg = UserDbConfig::new().with_user_id("laptop");
    let registry = desktop_cfg.format_registry();

    let mut desktop = device("luna_pinyin", &desktop_cfg, 10);
    put(&mut desktop, "ni hao", "你好", Record::new(Commits::active(4), 2.0, 10));
    put(&mut desktop, "zai jian", "再见", Record::new(Commits::active(1), 1.0, 9));

    let mut laptop = device("luna_pinyin", &laptop_cfg, 20);
    put(&mut laptop, "ni hao", "你好", Record::new(Commits::active(2), 3.0, 20));
    put(&mut laptop, "zai jian", "再见", Record::new(Commits::tombstone(3), 0.0, 18));

    let desktop_file = dir.path().join("desktop.userdb.txt");
    let laptop_file = dir.path().join("laptop.userdb.txt");
    assert_eq!(registry.resolve(&desktop_file), SnapshotFormat::PlainText);
    snapshot::backup(&desktop, &desktop_file, &registry).unwrap();
    snapshot::backup(&laptop, &laptop_file, &registry).unwrap();

    merge_snapshot(&mut desktop, &laptop_file, &desktop_cfg);
    merge_snapshot(&mut laptop, &desktop_file, &laptop_cfg);

    for store in [&desktop, &laptop] {
        assert_eq!(metadata::tick_count(store), 20);
        let hello = get(store, "ni hao", "你好");
        assert_eq!(hello.commits, Commits::active(4));
        assert_eq!(hello.tick, 20);
        let bye = get(store, "zai jian", "再见");
        assert_eq!(bye.commits, Commits::tombstone(3));
    }
    assert_eq!(metadata::user_id(&desktop), "desktop");
    assert_eq!(metadata::user_id(&laptop), "laptop");
}

#[test]
fn store_to_store_merge_advances_clock() {
    let config = UserDbConfig::new().with_user_id("phone");
    let mut local = device("luna_pinyin", &config, 5);
    let mut remote = device("luna_pinyin", &UserDbConfig::new(), 30);
    put(&mut remote, "a", "A", Record::new(Commits::active(1), 1.0, 30));

    {
        let mut merger = Merger::new(&mut local, &config);
        let stats = pump(&remote, &mut merger, ErrorPolicy::Abort).unwrap();
        assert_eq!(stats.records, 1);
        assert_eq!(merger.max_tick(), 30);
    }

    assert_eq!(metadata::tick_count(&local), 30);
    assert_eq!(metadata::user_id(&local), "phone");
    assert_eq!(get(&local, "a", "A").tick, 30);
}

#[test]
fn repeated_merge_with_default_decay_is_stable() {
    let config = UserDbConfig::new().with_user_id("local");
    let mut remote = device("r", &config, 50);
    put(&mut remote, "a", "A", Record::new(Commits::active(3), 5.0, 12));
    put(&mut remote, "b", "B", Record::new(Commits::tombstone(2), 1.0, 50));

    let run = |times: usize| {
        let mut local = device("l", &config, 40);
        put(&mut local, "a", "A", Record::new(Commits::active(1), 8.0, 40));
        for _ in 0..times {
            let mut merger = Merger::new(&mut local, &config);
            pump(&remote, &mut merger, ErrorPolicy::Abort).unwrap();
        }
        local.image()
    };

    assert_eq!(run(1), run(2));
}

#[test]
fn bundled_word_list_is_absorbed_without_touching_clock() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bundle.userdb.txt");
    std::fs::write(
        &path,
        "# Rime user dictionary\n#@/tick\t999\nni hao\t你好\tc=9 d=4\nbu yao\t不要\tc=-1\n",
    )
    .unwrap();

    let config = UserDbConfig::new();
    let mut store = device("luna_pinyin", &config, 3);
    put(&mut store, "ni hao", "你好", Record::new(Commits::active(2), 6.0, 3));
    put(&mut store, "bu yao", "不要", Record::new(Commits::active(5), 1.0, 2));

    {
        let mut importer = Importer::new(&mut store);
        snapshot::read_plain(&path, &mut importer, ErrorPolicy::Abort).unwrap();
        assert_eq!(importer.imported_count(), 2);
    }

    assert_eq!(metadata::tick_count(&store), 3);
    assert_eq!(
        get(&store, "ni hao", "你好"),
        Record::new(Commits::active(9), 6.0, 3)
    );
    assert_eq!(get(&store, "bu yao", "不要").commits, Commits::tombstone(5));
}

#[test]
fn file_store_backup_round_trip() {
    let dir = tempdir().unwrap();
    let config = UserDbConfig::new().with_user_id("desktop");
    let registry = config.format_registry();
    let snapshot_path = dir.path().join("luna.userdb.txt");

    {
        let mut store = FileStore::open(&dir.path().join("luna.userdb")).unwrap();
        metadata::create_metadata(&mut store, &config).unwrap();
        store
            .update(&compose_key("a", "A"), "c=1 d=1 t=1")
            .unwrap();
        snapshot::backup(&store, &snapshot_path, &registry).unwrap();
    }

    let mut restored = FileStore::open(&dir.path().join("copy.userdb")).unwrap();
    snapshot::restore(&mut restored, &snapshot_path, &registry, ErrorPolicy::Abort).unwrap();
    assert!(metadata::is_user_db(&restored));
    assert_eq!(metadata::db_name(&restored), "luna");
    assert_eq!(
        restored.fetch("a \tA").unwrap().as_deref(),
        Some("c=1 d=1 t=1")
    );
}
