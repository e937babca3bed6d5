//! # UserDB Storage
//!
//! Key-value store contract and backends for UserDB.
//!
//! Stores are **opaque string maps** with a small side table of metadata.
//! They do not interpret the record values they hold; record encoding,
//! merging and snapshot formats live in the crates above this one.
//!
//! ## Design Principles
//!
//! - A store is a flat `key -> value` map plus a `key -> value` metadata map
//! - No knowledge of record encoding, ticks or decay
//! - Must be `Send + Sync` so independent sessions can run on separate threads
//! - Each store owns a native backup format (a CBOR image)
//!
//! ## Available Stores
//!
//! - [`InMemoryStore`] - For testing and ephemeral stores
//! - [`FileStore`] - A store persisted as a locked image file
//!
//! ## Example
//!
//! ```rust
//! use userdb_storage::{KvStore, InMemoryStore};
//!
//! let mut store = InMemoryStore::new("luna_pinyin");
//! store.update("ni hao \t你好", "c=1 d=1 t=1").unwrap();
//! assert_eq!(
//!     store.fetch("ni hao \t你好").unwrap().as_deref(),
//!     Some("c=1 d=1 t=1")
//! );
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod image;
mod memory;
mod store;

pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use image::StoreImage;
pub use memory::InMemoryStore;
pub use store::KvStore;
