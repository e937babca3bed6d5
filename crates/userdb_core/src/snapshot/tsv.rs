//! Tab-separated snapshot streams.
//!
//! File layout:
//!
//! ```text
//! # Rime user dictionary
//! #@/db_name	luna_pinyin
//! #@/tick	42
//! ni hao 	你好	c=3 d=1.5 t=40
//! ```
//!
//! `#@` lines carry store metadata as `key<TAB>value`. Other `#` lines
//! and blank lines are ignored on read.

use crate::config::ErrorPolicy;
use crate::error::{SyncError, SyncResult};
use crate::sink::{RecordSink, TransferStats};
use crate::snapshot::format::RowFormat;
use std::io::{BufRead, Write};
use tracing::debug;
use userdb_storage::KvStore;

const META_PREFIX: &str = "#@";
const COMMENT_PREFIX: char = '#';
const FIELD_SEPARATOR: char = '\t';

/// Reads a snapshot and feeds it to a [`RecordSink`].
pub struct TsvReader<R: BufRead> {
    reader: R,
    format: RowFormat,
    policy: ErrorPolicy,
}

impl<R: BufRead> TsvReader<R> {
    /// Creates a reader using `format` to turn rows into records.
    pub fn new(reader: R, format: RowFormat) -> Self {
        Self {
            reader,
            format,
            policy: ErrorPolicy::default(),
        }
    }

    /// Sets what happens when the sink refuses a record.
    #[must_use]
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Streams every line into `sink`.
    ///
    /// Rows the format rejects are skipped and counted.
    ///
    /// # Errors
    ///
    /// Fails on any read error (including invalid UTF-8), on a refused
    /// metadata pair, and on record failures the policy does not tolerate.
    pub fn read_into<K: RecordSink + ?Sized>(&mut self, sink: &mut K) -> SyncResult<TransferStats> {
        let mut stats = TransferStats::default();
        let mut line = String::new();
        let mut line_no = 0usize;

        loop {
            line.clear();
            let read = self
                .reader
                .read_line(&mut line)
                .map_err(|e| SyncError::stream(line_no + 1, e.to_string()))?;
            if read == 0 {
                break;
            }
            line_no += 1;

            let text = line.trim_end_matches(['\n', '\r']);
            if text.is_empty() {
                continue;
            }
            if let Some(meta) = text.strip_prefix(META_PREFIX) {
                let Some((key, value)) = meta.split_once(FIELD_SEPARATOR) else {
                    debug!("line {}: metadata without value skipped", line_no);
                    stats.skipped += 1;
                    continue;
                };
                sink.meta_put(key, value)?;
                stats.metadata += 1;
                continue;
            }
            if text.starts_with(COMMENT_PREFIX) {
                continue;
            }

            let row: Vec<&str> = text.split(FIELD_SEPARATOR).collect();
            match (self.format.parser)(&row) {
                Some((key, value)) => stats.deliver(sink, &key, &value, self.policy)?,
                None => {
                    debug!("line {}: invalid row rejected", line_no);
                    stats.skipped += 1;
                }
            }
        }
        Ok(stats)
    }
}

/// Writes a store as a snapshot.
pub struct TsvWriter<W: Write> {
    writer: W,
    format: RowFormat,
}

impl<W: Write> TsvWriter<W> {
    /// Creates a writer using `format` to turn records into rows.
    pub fn new(writer: W, format: RowFormat) -> Self {
        Self { writer, format }
    }

    /// Writes the header, all metadata, then every record of `store`.
    ///
    /// Records the format cannot express, or whose row would start with
    /// `#`, are skipped and counted.
    ///
    /// # Errors
    ///
    /// Fails if the store cannot be read or the output cannot be written.
    pub fn write_from<S: KvStore + ?Sized>(&mut self, store: &S) -> SyncResult<TransferStats> {
        let mut stats = TransferStats::default();

        writeln!(self.writer, "{} {}", COMMENT_PREFIX, self.format.file_description)?;
        for (key, value) in store.meta_entries()? {
            writeln!(self.writer, "{META_PREFIX}{key}{FIELD_SEPARATOR}{value}")?;
            stats.metadata += 1;
        }
        for (key, value) in store.entries()? {
            match (self.format.formatter)(&key, &value) {
                // would read back as a comment line
                Some(row) if row.first().is_some_and(|f| f.starts_with(COMMENT_PREFIX)) => {
                    debug!("key '{}' clashes with comment syntax, skipped", key);
                    stats.skipped += 1;
                }
                Some(row) => {
                    writeln!(self.writer, "{}", row.join("\t"))?;
                    stats.records += 1;
                }
                None => {
                    debug!("invalid key '{}' skipped", key);
                    stats.skipped += 1;
                }
            }
        }
        self.writer.flush()?;
        Ok(stats)
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
