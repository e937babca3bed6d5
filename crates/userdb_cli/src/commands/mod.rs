//! CLI command implementations.

pub mod backup;
pub mod inspect;
pub mod merge;

use std::path::Path;
use userdb_core::{metadata, SyncError, UserDbConfig};
use userdb_storage::{FileStore, KvStore};

/// Opens the store at `path`, tagging it as a user dictionary if it is new.
///
/// Refuses existing stores that carry data but no `userdb` tag.
pub fn open_store(
    path: &Path,
    config: &UserDbConfig,
) -> Result<FileStore, Box<dyn std::error::Error>> {
    let mut store = FileStore::open_with_create_dirs(path)?;
    if !metadata::is_user_db(&store) {
        if store.entries()?.is_empty() && store.meta_entries()?.is_empty() {
            metadata::create_metadata(&mut store, config)?;
        } else {
            return Err(SyncError::NotUserDb(path.display().to_string()).into());
        }
    }
    Ok(store)
}

/// Opens an existing store file read-mostly, without creating it.
pub fn open_existing(path: &Path) -> Result<FileStore, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("No store found at {:?}", path).into());
    }
    let store = FileStore::open(path)?;
    if !metadata::is_user_db(&store) {
        return Err(SyncError::NotUserDb(path.display().to_string()).into());
    }
    Ok(store)
}
