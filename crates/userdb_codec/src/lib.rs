//! # UserDB Codec
//!
//! Record and key encoding for UserDB.
//!
//! Every value in a user dictionary store is a [`Record`] packed into a
//! short text form:
//!
//! ```text
//! c=<commits> d=<weight> t=<tick>
//! ```
//!
//! - Output field order is fixed
//! - Parsing is order-independent and tolerant of missing or unknown keys
//! - `weight` is always clamped into `[0, 10000]`
//!
//! Keys join an input code and a phrase: the code always ends with exactly
//! one space and is separated from the phrase by a tab (see [`key`]).
//!
//! ## Usage
//!
//! ```
//! use userdb_codec::{Commits, Record};
//!
//! let record = Record::new(Commits::from_raw(3), 1.5, 42);
//! let text = record.encode();
//! assert_eq!(text, "c=3 d=1.5 t=42");
//! assert_eq!(Record::decode(&text).unwrap(), record);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod commits;
mod error;
pub mod key;
mod record;

pub use commits::Commits;
pub use error::{CodecError, CodecResult};
pub use key::{compose_key, normalize_code, split_key, CODE_TERMINATOR, COLUMN_SEPARATOR};
pub use record::{Record, Tick, MAX_WEIGHT};
