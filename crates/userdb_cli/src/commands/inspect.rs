//! Inspect command implementation.

use super::open_existing;
use serde::Serialize;
use std::path::Path;
use userdb_codec::{split_key, Record};
use userdb_core::metadata;
use userdb_storage::KvStore;

/// Store inspection result.
#[derive(Debug, Serialize, PartialEq)]
pub struct InspectResult {
    /// Store path.
    pub path: String,
    /// Dictionary name.
    pub db_name: String,
    /// Identity of the last writer.
    pub user_id: String,
    /// Version that created the store.
    pub rime_version: String,
    /// Store clock.
    pub tick: u64,
    /// Number of records.
    pub record_count: usize,
    /// Number of live entries.
    pub active_count: usize,
    /// Number of tombstones.
    pub tombstone_count: usize,
    /// Records whose key or value cannot be parsed.
    pub malformed_count: usize,
}

/// Collects statistics for a store.
pub fn inspect<S: KvStore + ?Sized>(
    store: &S,
    path: &Path,
) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let mut result = InspectResult {
        path: path.display().to_string(),
        db_name: metadata::db_name(store),
        user_id: metadata::user_id(store),
        rime_version: metadata::rime_version(store),
        tick: metadata::tick_count(store),
        record_count: 0,
        active_count: 0,
        tombstone_count: 0,
        malformed_count: 0,
    };

    for (key, value) in store.entries()? {
        result.record_count += 1;
        match (split_key(&key), Record::decode(&value)) {
            (Some(_), Ok(record)) if record.is_deleted() => result.tombstone_count += 1,
            (Some(_), Ok(_)) => result.active_count += 1,
            _ => result.malformed_count += 1,
        }
    }

    Ok(result)
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_existing(path)?;
    let result = inspect(&store, path)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn print_text_output(result: &InspectResult) {
    println!("UserDB Store Inspection");
    println!("=======================");
    println!("Path: {}", result.path);
    println!("Name: {}", result.db_name);
    println!("User ID: {}", result.user_id);
    println!("Version: {}", result.rime_version);
    println!("Tick: {}", result.tick);
    println!();
    println!("Records: {}", result.record_count);
    println!("  Active: {}", result.active_count);
    println!("  Tombstones: {}", result.tombstone_count);
    if result.malformed_count > 0 {
        println!("  Malformed: {}", result.malformed_count);
    }
}
