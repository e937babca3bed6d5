//! # UserDB Core
//!
//! Merge, import and snapshot engine for UserDB.
//!
//! This crate provides:
//! - [`Merger`]: tick-aware reconciliation of a foreign replica into a local store
//! - [`Importer`]: one-way absorb of timeless records (bundled word lists)
//! - [`snapshot`]: plain text backup/restore with format dispatch by file suffix
//! - [`metadata`]: store identity and the logical clock
//! - [`decay`]: the weight-aging contract and its default strategy
//!
//! ## Architecture
//!
//! An external driver walks a source (another store via [`pump`], or a
//! text snapshot via [`snapshot::TsvReader`]) and feeds metadata and
//! records one at a time into a [`RecordSink`]. Sinks read and write the
//! target through the [`userdb_storage::KvStore`] contract.
//!
//! ## Key Invariants
//!
//! - Weights stay within `[0, 10000]`
//! - Records are never removed; deletion is a negative commit count
//! - A merge stamps every touched record with one tick, `max(ours, theirs)`
//! - The store clock only moves forward, when a merge session closes
//! - Sessions are not atomic across keys

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
pub mod decay;
mod error;
mod importer;
mod merger;
pub mod metadata;
mod sink;
pub mod snapshot;

pub use config::{ErrorPolicy, UserDbConfig};
pub use decay::{Decay, ExponentialDecay, NoDecay};
pub use error::{SyncError, SyncResult};
pub use importer::{absorb, Importer};
pub use merger::Merger;
pub use sink::{pump, RecordSink, StoreSink, TransferStats};

/// Crate version, recorded in new stores.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
