//! Snapshot formats and the rows of the plain text format.

use std::path::Path;
use userdb_codec::{compose_key, normalize_code, split_key};

/// Suffix of plain text user dictionary snapshots.
pub const PLAIN_SNAPSHOT_SUFFIX: &str = ".userdb.txt";

/// How a snapshot file is written and read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    /// Tab-separated rows `code<TAB>phrase<TAB>value`.
    PlainText,
    /// The store's own backup image.
    Native,
}

/// Maps file-name suffixes to snapshot formats.
///
/// Files matching no registered suffix use [`SnapshotFormat::Native`].
#[derive(Debug, Clone, Default)]
pub struct FormatRegistry {
    entries: Vec<(String, SnapshotFormat)>,
}

impl FormatRegistry {
    /// Creates an empty registry; every file resolves to `Native`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry mapping `suffix` to the plain text format.
    #[must_use]
    pub fn with_plain_suffix(suffix: &str) -> Self {
        let mut registry = Self::new();
        registry.register(suffix, SnapshotFormat::PlainText);
        registry
    }

    /// Maps `suffix` to `format`, replacing an earlier mapping.
    pub fn register(&mut self, suffix: impl Into<String>, format: SnapshotFormat) {
        let suffix = suffix.into();
        self.entries.retain(|(s, _)| *s != suffix);
        self.entries.push((suffix, format));
    }

    /// Picks the format for `path`. The longest matching suffix wins.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> SnapshotFormat {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        self.entries
            .iter()
            .filter(|(suffix, _)| !suffix.is_empty() && name.ends_with(suffix.as_str()))
            .max_by_key(|(suffix, _)| suffix.len())
            .map_or(SnapshotFormat::Native, |(_, format)| *format)
    }
}

/// Turns one text row into a `(key, value)` pair.
pub type RowParser = fn(&[&str]) -> Option<(String, String)>;

/// Turns a `(key, value)` pair into one text row.
pub type RowFormatter = fn(&str, &str) -> Option<Vec<String>>;

/// A row parser/formatter pair with the header written to each file.
#[derive(Debug, Clone, Copy)]
pub struct RowFormat {
    /// Row to record.
    pub parser: RowParser,
    /// Record to row.
    pub formatter: RowFormatter,
    /// Human-readable file description.
    pub file_description: &'static str,
}

/// The plain text user dictionary format.
pub const PLAIN_USERDB_FORMAT: RowFormat = RowFormat {
    parser: parse_userdb_row,
    formatter: format_userdb_row,
    file_description: "Rime user dictionary",
};

/// Row parser of [`PLAIN_USERDB_FORMAT`].
///
/// Needs non-empty code and phrase columns; the value column is optional.
pub fn parse_userdb_row(row: &[&str]) -> Option<(String, String)> {
    let (code, phrase) = match row {
        [code, phrase, ..] if !code.is_empty() && !phrase.is_empty() => (*code, *phrase),
        _ => return None,
    };
    let value = row.get(2).copied().unwrap_or_default();
    Some((compose_key(code, phrase), value.to_string()))
}

/// Row formatter of [`PLAIN_USERDB_FORMAT`].
///
/// Keys that do not split into exactly two non-empty parts produce no row.
pub fn format_userdb_row(key: &str, value: &str) -> Option<Vec<String>> {
    let (code, phrase) = split_key(key)?;
    Some(vec![
        normalize_code(code).into_owned(),
        phrase.to_string(),
        value.to_string(),
    ])
}
