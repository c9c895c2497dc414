//! Entry identifier newtype.
//!
//! Entries are numbered by a monotonically increasing sequence that is never
//! reused, not even after `clear()`. An `EntryId` held by a caller therefore
//! either resolves to the entry it was issued for or to nothing at all; it
//! can never alias a newer entry after eviction.

use std::fmt;

/// Identifier of a logical line in the scrollback.
///
/// Ordering of ids matches document order of the entries they name.
/// NEVER export the constructor outside the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(u64);

impl EntryId {
    pub(crate) fn from_seq(seq: u64) -> Self {
        Self(seq)
    }

    /// Raw sequence number.
    pub fn seq(&self) -> u64 {
        self.0
    }

    /// Id of the entry appended immediately after this one.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Id of the entry appended immediately before this one, if any.
    pub fn prev(&self) -> Option<Self> {
        self.0.checked_sub(1).map(Self)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
