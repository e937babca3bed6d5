//! Commit counter with deletion flag.

use std::fmt;

/// How often a candidate was committed, and whether it was later deleted.
///
/// On the wire this is a single signed integer: the magnitude is the
/// usage frequency and a negative sign marks a tombstone. A tombstone
/// keeps its magnitude so frequency history survives deletion.
///
/// A tombstone of magnitude zero has no wire form distinct from an active
/// zero, so it is normalized to an active zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Commits {
    magnitude: u32,
    deleted: bool,
}

impl Commits {
    /// No usage, not deleted.
    pub const ZERO: Self = Self {
        magnitude: 0,
        deleted: false,
    };

    /// An active counter.
    #[must_use]
    pub const fn active(magnitude: u32) -> Self {
        Self {
            magnitude,
            deleted: false,
        }
    }

    /// A tombstone retaining `magnitude`.
    #[must_use]
    pub const fn tombstone(magnitude: u32) -> Self {
        Self {
            magnitude,
            deleted: magnitude > 0,
        }
    }

    /// Converts from the signed wire form.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        if raw < 0 {
            Self::tombstone(raw.unsigned_abs())
        } else {
            Self::active(raw.unsigned_abs())
        }
    }

    /// Converts to the signed wire form, saturating at the `i32` range.
    #[must_use]
    pub fn to_raw(self) -> i32 {
        let magnitude = i64::from(self.magnitude);
        let signed = if self.deleted { -magnitude } else { magnitude };
        signed.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }

    /// Usage frequency regardless of deletion.
    #[must_use]
    pub const fn magnitude(self) -> u32 {
        self.magnitude
    }

    /// True for a tombstone.
    #[must_use]
    pub const fn is_deleted(self) -> bool {
        self.deleted
    }

    /// True for a zero counter.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.magnitude == 0
    }
}

impl From<i32> for Commits {
    fn from(raw: i32) -> Self {
        Self::from_raw(raw)
    }
}

impl fmt::Display for Commits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_raw())
    }
}
