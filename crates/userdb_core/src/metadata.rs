//! Store metadata: identity, type tag and the logical clock.

use crate::config::UserDbConfig;
use crate::error::SyncResult;
use userdb_codec::Tick;
use userdb_storage::KvStore;

/// Metadata key holding the store type tag.
pub const DB_TYPE_KEY: &str = "/db_type";
/// Metadata key holding the dictionary name.
pub const DB_NAME_KEY: &str = "/db_name";
/// Metadata key holding the identity of the last writer.
pub const USER_ID_KEY: &str = "/user_id";
/// Metadata key holding the version of the writing software.
pub const RIME_VERSION_KEY: &str = "/rime_version";
/// Metadata key holding the store clock.
pub const TICK_KEY: &str = "/tick";

/// Type tag of user dictionaries.
pub const USER_DB_TYPE: &str = "userdb";
/// Extension of native store files.
pub const USER_DB_EXTENSION: &str = ".userdb";

/// Reads the store clock, defaulting to 1 when absent or unparseable.
pub fn tick_count<S: KvStore + ?Sized>(store: &S) -> Tick {
    store
        .meta_fetch(TICK_KEY)
        .ok()
        .flatten()
        .and_then(|tick| tick.trim().parse().ok())
        .unwrap_or(1)
}

/// Writes the metadata of a fresh user dictionary.
pub fn create_metadata<S: KvStore + ?Sized>(store: &mut S, config: &UserDbConfig) -> SyncResult<()> {
    let name = store.name().to_string();
    store.meta_update(DB_NAME_KEY, &name)?;
    store.meta_update(DB_TYPE_KEY, USER_DB_TYPE)?;
    store.meta_update(RIME_VERSION_KEY, &config.rime_version)?;
    store.meta_update(USER_ID_KEY, &config.user_id)?;
    Ok(())
}

/// True if the store is tagged as a user dictionary.
pub fn is_user_db<S: KvStore + ?Sized>(store: &S) -> bool {
    matches!(store.meta_fetch(DB_TYPE_KEY), Ok(Some(t)) if t == USER_DB_TYPE)
}

/// Dictionary name without the native extension; empty if unknown.
pub fn db_name<S: KvStore + ?Sized>(store: &S) -> String {
    let Ok(Some(name)) = store.meta_fetch(DB_NAME_KEY) else {
        return String::new();
    };
    match name.strip_suffix(USER_DB_EXTENSION) {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

/// Identity of the last writer, `"unknown"` if not recorded.
pub fn user_id<S: KvStore + ?Sized>(store: &S) -> String {
    store
        .meta_fetch(USER_ID_KEY)
        .ok()
        .flatten()
        .unwrap_or_else(|| "unknown".to_string())
}

/// Version of the software that created the store; empty if not recorded.
pub fn rime_version<S: KvStore + ?Sized>(store: &S) -> String {
    store
        .meta_fetch(RIME_VERSION_KEY)
        .ok()
        .flatten()
        .unwrap_or_default()
}
