//! Backup and restore commands.
//!
//! The snapshot file suffix decides the format: `.userdb.txt` files are
//! plain text rows, anything else is the store's native image.

use super::{open_existing, open_store};
use std::path::Path;
use tracing::info;
use userdb_core::{snapshot, UserDbConfig};

/// Write the store to a snapshot file.
pub fn create(
    store_path: &Path,
    output_path: &Path,
    config: &UserDbConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Creating backup of {:?}", store_path);

    let store = open_existing(store_path)?;
    let registry = config.format_registry();
    let stats = snapshot::backup(&store, output_path, &registry)?;

    println!("✓ Backup created successfully");
    println!("  Path: {:?}", output_path);
    println!("  Format: {:?}", registry.resolve(output_path));
    println!("  Records: {}", stats.records);
    if stats.skipped > 0 {
        println!("  Skipped (malformed keys): {}", stats.skipped);
    }

    Ok(())
}

/// Load a snapshot file into the store.
pub fn restore(
    store_path: &Path,
    input_path: &Path,
    config: &UserDbConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Restoring store from {:?}", input_path);

    if !input_path.exists() {
        return Err(format!("No snapshot found at {:?}", input_path).into());
    }

    let mut store = open_store(store_path, config)?;
    let registry = config.format_registry();
    let stats = snapshot::restore(&mut store, input_path, &registry, config.on_record_error)?;
    store.flush()?;

    println!("✓ Store restored successfully");
    println!("  Path: {:?}", store_path);
    println!("  Records restored: {}", stats.records);
    if stats.skipped > 0 {
        println!("  Rejected rows: {}", stats.skipped);
    }
    if stats.failed > 0 {
        println!("  Failed records: {}", stats.failed);
    }

    Ok(())
}
