//! The per-key usage record and its text encoding.

use crate::commits::Commits;
use crate::error::{CodecError, CodecResult};
use std::fmt;
use tracing::warn;

/// Store-wide logical clock value.
pub type Tick = u64;

/// Upper bound for [`Record::weight`].
pub const MAX_WEIGHT: f64 = 10000.0;

/// Usage history of one dictionary entry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Record {
    /// Commit counter; negative on the wire for tombstones.
    pub commits: Commits,
    /// Recency/usage score in `[0, MAX_WEIGHT]`.
    pub weight: f64,
    /// Logical time of the last write.
    pub tick: Tick,
}

impl Record {
    /// Creates a record, clamping `weight` into `[0, MAX_WEIGHT]`.
    #[must_use]
    pub fn new(commits: Commits, weight: f64, tick: Tick) -> Self {
        Self {
            commits,
            weight: clamp_weight(weight),
            tick,
        }
    }

    /// Packs the record as `c=<commits> d=<weight> t=<tick>`.
    ///
    /// The weight is printed in its shortest exact form, so decoding the
    /// output yields the same record.
    #[must_use]
    pub fn encode(&self) -> String {
        format!("c={} d={} t={}", self.commits, self.weight, self.tick)
    }

    /// Parses a packed record.
    ///
    /// Tokens without `=` and unknown keys are skipped; missing fields
    /// stay zero.
    ///
    /// # Errors
    ///
    /// Returns `InvalidField` when `c`, `d` or `t` holds a value that does
    /// not parse as its numeric type.
    pub fn decode(text: &str) -> CodecResult<Self> {
        let mut record = Self::default();
        for token in text.split_whitespace() {
            let Some((key, value)) = token.split_once('=') else {
                continue;
            };
            match key {
                "c" => {
                    let raw: i32 = value
                        .parse()
                        .map_err(|_| CodecError::invalid_field(key, value))?;
                    record.commits = Commits::from_raw(raw);
                }
                "d" => {
                    let weight: f64 = value
                        .parse()
                        .map_err(|_| CodecError::invalid_field(key, value))?;
                    if weight.is_nan() {
                        return Err(CodecError::invalid_field(key, value));
                    }
                    record.weight = clamp_weight(weight);
                }
                "t" => {
                    record.tick = value
                        .parse()
                        .map_err(|_| CodecError::invalid_field(key, value))?;
                }
                _ => {}
            }
        }
        Ok(record)
    }

    /// Parses a packed record, substituting the zero record on failure.
    ///
    /// Used for values read back from a store, where a corrupt entry must
    /// not stop a whole session.
    #[must_use]
    pub fn decode_or_default(text: &str) -> Self {
        Self::decode(text).unwrap_or_else(|e| {
            warn!("failed in parsing key-value from userdb entry '{}': {}", text, e);
            Self::default()
        })
    }

    /// True if this record is a tombstone.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.commits.is_deleted()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

fn clamp_weight(weight: f64) -> f64 {
    weight.clamp(0.0, MAX_WEIGHT)
}
