//! Forward text search.
//!
//! Matching is an ASCII case-insensitive substring test over the raw entry
//! bytes, attribute codes included, so a match never straddles a color change
//! it cannot see.

use std::ops::Range;

use tracing::debug;

use super::store::LineStore;
use crate::model::EntryId;

/// A match found by [`find_next`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Entry containing the match.
    pub entry: EntryId,
    /// Matched bytes.
    pub bytes: Range<usize>,
}

/// First match in the entries strictly after `start`.
///
/// Scans from the head when `start` is `None` or no longer in the store. An
/// empty pattern matches nothing.
pub fn find_next(store: &LineStore, pattern: &[u8], start: Option<EntryId>) -> Option<SearchHit> {
    if pattern.is_empty() {
        return None;
    }
    let from = match start.map(|id| (id, store.index_of(id))) {
        Some((_, Some(index))) => index + 1,
        Some((id, None)) => {
            debug!(entry = %id, "search start no longer present, scanning from head");
            0
        }
        None => 0,
    };

    store.iter().skip(from).find_map(|line| {
        find_ignore_ascii_case(line.bytes(), pattern).map(|at| SearchHit {
            entry: line.id(),
            bytes: at..at + pattern.len(),
        })
    })
}

/// Byte offset of the first case-insensitive occurrence of `needle`.
pub fn find_ignore_ascii_case(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}
