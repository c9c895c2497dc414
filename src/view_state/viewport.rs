//! Visual line number to (entry, sub-line) mapping.
//!
//! Scrolling asks for the same neighbourhood over and over, so the index
//! caches the location of the first visible row (the page top) and walks
//! from there. Without a cache it walks from the head of the store.

use tracing::trace;

use super::store::{EvictedEntry, LineStore};
use crate::model::EntryId;

/// A visual row resolved to its entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// Entry the row belongs to.
    pub entry: EntryId,
    /// Row within the entry, 0-based.
    pub sub_line: usize,
}

/// Cached location of the first visible row.
///
/// `line - sub_line` is the absolute visual line where `entry` starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTop {
    /// Entry holding the first visible row.
    pub entry: EntryId,
    /// Row within that entry.
    pub sub_line: usize,
    /// Absolute visual line number.
    pub line: usize,
}

impl PageTop {
    fn entry_start(&self) -> Option<usize> {
        self.line.checked_sub(self.sub_line)
    }
}

/// Page-top cache plus the walks that use it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewportIndex {
    page_top: Option<PageTop>,
}

impl ViewportIndex {
    /// Index with no cached page top.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cached page top.
    pub fn page_top(&self) -> Option<PageTop> {
        self.page_top
    }

    /// Drop the cache (width change, clear, reflow).
    pub fn invalidate(&mut self) {
        self.page_top = None;
    }

    /// Keep the cache consistent after a head eviction.
    pub fn on_evicted(&mut self, evicted: &EvictedEntry) {
        let Some(top) = self.page_top.as_mut() else {
            return;
        };
        if top.entry == evicted.id {
            self.page_top = None;
        } else {
            top.line = top.line.saturating_sub(evicted.sub_lines);
        }
    }

    /// Resolve `line` and cache it as the page top.
    pub fn set_page_top(&mut self, store: &LineStore, line: usize) -> Option<Location> {
        let location = self.locate(store, line);
        self.page_top = location.map(|loc| PageTop {
            entry: loc.entry,
            sub_line: loc.sub_line,
            line,
        });
        location
    }

    /// Resolve an absolute visual line number.
    ///
    /// `None` when the store is empty or `line` is past the last row.
    pub fn locate(&self, store: &LineStore, line: usize) -> Option<Location> {
        if line >= store.total_visual_lines() {
            return None;
        }

        if let Some(top) = self.page_top {
            if let (Some(index), Some(entry_start)) = (store.index_of(top.entry), top.entry_start()) {
                if line == top.line {
                    return Some(Location {
                        entry: top.entry,
                        sub_line: top.sub_line,
                    });
                }
                if line > top.line {
                    return walk_forward(store, index, entry_start, line);
                }
                if top.line - line < line {
                    return walk_backward(store, index, entry_start, line);
                }
            } else {
                trace!(entry = %top.entry, "ignoring stale page top");
            }
        }

        walk_forward(store, 0, 0, line)
    }

    /// First absolute visual line of `id`.
    pub fn line_of(&self, store: &LineStore, id: EntryId) -> Option<usize> {
        let target = store.index_of(id)?;
        let (mut index, mut line) = match self.page_top {
            Some(top) => match (store.index_of(top.entry), top.entry_start()) {
                (Some(i), Some(start)) if i <= target => (i, start),
                _ => (0, 0),
            },
            None => (0, 0),
        };
        while index < target {
            line += store.at(index)?.sub_lines();
            index += 1;
        }
        Some(line)
    }
}

fn walk_forward(store: &LineStore, from: usize, from_line: usize, target: usize) -> Option<Location> {
    let mut lines = from_line;
    let mut index = from;
    while let Some(entry) = store.at(index) {
        let taken = entry.sub_lines();
        if lines + taken > target {
            return Some(Location {
                entry: entry.id(),
                sub_line: target - lines,
            });
        }
        lines += taken;
        index += 1;
    }
    None
}

fn walk_backward(store: &LineStore, from: usize, from_line: usize, target: usize) -> Option<Location> {
    let mut lines = from_line;
    let mut index = from;
    loop {
        if lines <= target {
            let entry = store.at(index)?;
            return Some(Location {
                entry: entry.id(),
                sub_line: target - lines,
            });
        }
        index = index.checked_sub(1)?;
        lines = lines.checked_sub(store.at(index)?.sub_lines())?;
    }
}
