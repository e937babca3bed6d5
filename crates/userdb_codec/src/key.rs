//! Store key layout.
//!
//! ```text
//! key ::= code ' ' '\t' phrase
//! ```
//!
//! An old encoder wrote keys whose code lacked the trailing space. Such
//! keys are still found in stores and snapshots in the wild, so every
//! place that splits or composes a key passes the code through
//! [`normalize_code`]; legacy and current stores then agree on key
//! identity.

use std::borrow::Cow;

/// Character every normalized code ends with.
pub const CODE_TERMINATOR: char = ' ';

/// Separator between code and phrase.
pub const COLUMN_SEPARATOR: char = '\t';

/// Appends [`CODE_TERMINATOR`] to `code` unless it is already there.
#[must_use]
pub fn normalize_code(code: &str) -> Cow<'_, str> {
    if code.ends_with(CODE_TERMINATOR) {
        Cow::Borrowed(code)
    } else {
        let mut fixed = String::with_capacity(code.len() + 1);
        fixed.push_str(code);
        fixed.push(CODE_TERMINATOR);
        Cow::Owned(fixed)
    }
}

/// Joins a code and a phrase into a store key.
#[must_use]
pub fn compose_key(code: &str, phrase: &str) -> String {
    let code = normalize_code(code);
    let mut key = String::with_capacity(code.len() + 1 + phrase.len());
    key.push_str(&code);
    key.push(COLUMN_SEPARATOR);
    key.push_str(phrase);
    key
}

/// Splits a store key into `(code, phrase)`.
///
/// Returns `None` unless the key holds exactly two non-empty parts.
/// The code is returned as stored; callers normalize it as needed.
#[must_use]
pub fn split_key(key: &str) -> Option<(&str, &str)> {
    let mut parts = key.split(COLUMN_SEPARATOR);
    let code = parts.next()?;
    let phrase = parts.next()?;
    if parts.next().is_some() || code.is_empty() || phrase.is_empty() {
        return None;
    }
    Some((code, phrase))
}
