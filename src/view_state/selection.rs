//! Selection marks and minimal re-render requests.
//!
//! The selection is an anchor and an active position, each an entry plus a
//! byte offset. Every entry between the normalized start and end carries a
//! [`MarkRange`]; all other entries are unmarked.
//!
//! When the selection moves, [`SelectionModel::set_range`] compares the old
//! and new ranges and returns only the byte spans whose highlighting changed:
//!
//! - no previous selection: the new span
//! - same entries, one edge moved: the span between the old and new edge
//! - end moved to another entry with the start fixed: the span between the
//!   two end positions (symmetric when the start moves)
//! - anything else: the whole old range, then the new range minus overlaps

use std::cmp::{max, min};
use std::ops::Range;

use tracing::{debug, trace};

use super::store::LineStore;
use crate::model::attr::{convert_attributes, strip_attributes};
use crate::model::{EntryId, MarkRange};

/// A byte position in the scrollback. Orders in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextPosition {
    /// Entry holding the position.
    pub entry: EntryId,
    /// Byte offset within the entry.
    pub offset: usize,
}

impl TextPosition {
    /// Position `offset` bytes into `entry`.
    pub fn new(entry: EntryId, offset: usize) -> Self {
        Self { entry, offset }
    }
}

/// Normalized selection, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRange {
    /// First selected position.
    pub start: TextPosition,
    /// Position one past the selection.
    pub end: TextPosition,
}

impl SelectionRange {
    fn between(a: TextPosition, b: TextPosition) -> Self {
        Self {
            start: min(a, b),
            end: max(a, b),
        }
    }

    /// True when `id` lies between the start and end entries.
    pub fn spans(&self, id: EntryId) -> bool {
        self.start.entry <= id && id <= self.end.entry
    }
}

/// A byte span of one entry that must be repainted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    /// Entry to repaint.
    pub entry: EntryId,
    /// Bytes of the entry whose appearance changed.
    pub bytes: Range<usize>,
}

impl RenderRequest {
    /// Request for `bytes` of `entry`.
    pub fn new(entry: EntryId, bytes: Range<usize>) -> Self {
        Self { entry, bytes }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Selection {
    anchor: TextPosition,
    active: TextPosition,
}

impl Selection {
    fn range(&self) -> SelectionRange {
        SelectionRange::between(self.anchor, self.active)
    }
}

/// Current selection and its diffing logic.
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    current: Option<Selection>,
}

impl SelectionModel {
    /// No selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalized range of the current selection.
    pub fn range(&self) -> Option<SelectionRange> {
        self.current.map(|s| s.range())
    }

    /// Where the selection was started.
    pub fn anchor(&self) -> Option<TextPosition> {
        self.current.map(|s| s.anchor)
    }

    /// True while something is selected.
    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// True when `id` is inside the selected entries.
    pub fn contains(&self, id: EntryId) -> bool {
        self.range().is_some_and(|r| r.spans(id))
    }

    /// Move the selection to `anchor..active` and report what to repaint.
    ///
    /// Offsets past the end of an entry are clamped. A stale entry id leaves
    /// the selection untouched and returns no requests.
    pub fn set_range(
        &mut self,
        store: &mut LineStore,
        anchor: TextPosition,
        active: TextPosition,
    ) -> Vec<RenderRequest> {
        let (Some(anchor), Some(active)) = (clamp(store, anchor), clamp(store, active)) else {
            trace!(anchor = %anchor.entry, active = %active.entry, "ignoring selection on stale entry");
            return Vec::new();
        };

        let new = SelectionRange::between(anchor, active);
        let old = self.range().filter(|r| store.contains(r.start.entry) && store.contains(r.end.entry));

        if old == Some(new) {
            self.current = Some(Selection { anchor, active });
            return Vec::new();
        }

        let mut requests = Vec::new();
        match old {
            None => span(store, new.start, new.end, &mut requests),
            Some(old)
                if old.start.entry == new.start.entry && old.end.entry == new.end.entry =>
            {
                if old.start.offset == new.start.offset || old.end.offset == new.end.offset {
                    let (a, b) = if old.end != new.end {
                        (old.end, new.end)
                    } else {
                        (old.start, new.start)
                    };
                    span(store, min(a, b), max(a, b), &mut requests);
                } else if new.start.entry == new.end.entry {
                    requests.push(RenderRequest::new(
                        new.start.entry,
                        min(old.start.offset, new.start.offset)..max(old.end.offset, new.end.offset),
                    ));
                } else {
                    let start_len = store.get(new.start.entry).map_or(0, |l| l.len());
                    requests.push(RenderRequest::new(
                        new.start.entry,
                        min(old.start.offset, new.start.offset)..start_len,
                    ));
                    requests.push(RenderRequest::new(
                        new.end.entry,
                        0..max(old.end.offset, new.end.offset),
                    ));
                }
            }
            Some(old) if old.start == new.start => {
                span(store, min(old.end, new.end), max(old.end, new.end), &mut requests);
            }
            Some(old) if old.end == new.end => {
                span(store, min(old.start, new.start), max(old.start, new.start), &mut requests);
            }
            Some(old) => {
                trace!("selection crossed over, repainting both ranges");
                whole(store, old.start.entry, old.end.entry, &mut requests);
                if new.start.entry == old.start.entry {
                    if new.start.entry != new.end.entry {
                        whole(store, new.start.entry.next(), new.end.entry, &mut requests);
                    }
                } else if new.end.entry == old.end.entry {
                    if let Some(before_end) = new.end.entry.prev() {
                        if new.start.entry != new.end.entry {
                            whole(store, new.start.entry, before_end, &mut requests);
                        }
                    }
                } else {
                    whole(store, new.start.entry, new.end.entry, &mut requests);
                }
            }
        }

        self.apply_marks(store, new);
        self.current = Some(Selection { anchor, active });
        normalize_requests(store, requests)
    }

    fn apply_marks(&self, store: &mut LineStore, new: SelectionRange) {
        if let Some(previous) = self.range() {
            for id in live_ids(store, previous) {
                if !new.spans(id) {
                    store.set_mark(id, None);
                }
            }
        }
        for id in live_ids(store, new) {
            let mark = mark_for(store, new, id);
            store.set_mark(id, mark);
        }
    }

    /// Remove the selection and return the spans that were highlighted.
    pub fn clear(&mut self, store: &mut LineStore) -> Vec<RenderRequest> {
        let Some(selection) = self.current.take() else {
            return Vec::new();
        };
        let mut requests = Vec::new();
        for id in live_ids(store, selection.range()) {
            let mark = store.get(id).and_then(|l| l.mark());
            if let Some(mark) = mark {
                requests.push(RenderRequest::new(id, mark.start..mark.end));
            }
            store.set_mark(id, None);
        }
        normalize_requests(store, requests)
    }

    /// Drop the selection without touching entries (after `clear()`).
    pub fn forget(&mut self) {
        self.current = None;
    }

    /// Clear the selection if `evicted` was part of it.
    pub fn on_evicted(&mut self, store: &mut LineStore, evicted: EntryId) -> Vec<RenderRequest> {
        if !self.contains(evicted) {
            return Vec::new();
        }
        debug!(entry = %evicted, "selected entry evicted, clearing selection");
        self.clear(store)
    }

    /// Selected text: each marked span in document order joined by `\n`.
    ///
    /// Attribute codes are stripped, or rewritten as `%C`/`%B`/`%U`/`%R`/`%O`
    /// when `color_paste` is set. `None` when nothing is marked.
    pub fn text(&self, store: &LineStore, color_paste: bool) -> Option<String> {
        let range = self.range()?;
        let mut raw = Vec::new();
        let mut any = false;
        for id in live_ids(store, range) {
            let Some(line) = store.get(id) else { continue };
            let Some(mark) = line.mark() else { continue };
            if any {
                raw.push(b'\n');
            }
            any = true;
            let end = mark.end.min(line.len());
            raw.extend_from_slice(&line.bytes()[mark.start.min(end)..end]);
        }
        if !any {
            return None;
        }
        let converted = if color_paste {
            convert_attributes(&raw)
        } else {
            strip_attributes(&raw)
        };
        Some(String::from_utf8_lossy(&converted).into_owned())
    }
}

fn clamp(store: &LineStore, pos: TextPosition) -> Option<TextPosition> {
    let len = store.get(pos.entry)?.len();
    if pos.offset > len {
        debug!(entry = %pos.entry, offset = pos.offset, len, "clamping selection offset");
    }
    Some(TextPosition::new(pos.entry, pos.offset.min(len)))
}

/// Mark of `id` under `range`.
fn mark_for(store: &LineStore, range: SelectionRange, id: EntryId) -> Option<MarkRange> {
    let len = store.get(id)?.len();
    let (start, end) = (range.start, range.end);
    if start.entry == end.entry {
        return Some(MarkRange::new(start.offset, end.offset));
    }
    if id == start.entry {
        Some(MarkRange::new(start.offset, len))
    } else if id == end.entry {
        // a selection ending at offset 0 leaves the last entry unmarked
        (end.offset > 0).then(|| MarkRange::new(0, end.offset))
    } else {
        Some(MarkRange::new(0, len))
    }
}

/// Ids of the live entries spanned by `range`.
fn live_ids(store: &LineStore, range: SelectionRange) -> Vec<EntryId> {
    let first = match store.first() {
        Some(line) => max(line.id(), range.start.entry),
        None => return Vec::new(),
    };
    store.range(first, range.end.entry).map(|l| l.id()).collect()
}

/// Requests for the document span `lo..hi`.
fn span(store: &LineStore, lo: TextPosition, hi: TextPosition, out: &mut Vec<RenderRequest>) {
    if lo.entry == hi.entry {
        out.push(RenderRequest::new(lo.entry, lo.offset..hi.offset));
        return;
    }
    for line in store.range(lo.entry, hi.entry) {
        let bytes = if line.id() == lo.entry {
            lo.offset..line.len()
        } else if line.id() == hi.entry {
            0..hi.offset
        } else {
            0..line.len()
        };
        out.push(RenderRequest::new(line.id(), bytes));
    }
}

/// Requests for entries `from..=to` in full.
fn whole(store: &LineStore, from: EntryId, to: EntryId, out: &mut Vec<RenderRequest>) {
    for line in store.range(from, to) {
        out.push(RenderRequest::new(line.id(), 0..line.len()));
    }
}

/// Drop stale and empty requests, merge per entry, order by entry.
fn normalize_requests(store: &LineStore, mut requests: Vec<RenderRequest>) -> Vec<RenderRequest> {
    requests.retain(|r| r.bytes.start < r.bytes.end && store.contains(r.entry));
    requests.sort_by_key(|r| (r.entry, r.bytes.start));

    let mut merged: Vec<RenderRequest> = Vec::with_capacity(requests.len());
    for request in requests {
        match merged.last_mut() {
            Some(last) if last.entry == request.entry => {
                last.bytes.start = min(last.bytes.start, request.bytes.start);
                last.bytes.end = max(last.bytes.end, request.bytes.end);
            }
            _ => merged.push(request),
        }
    }
    merged
}

#[cfg(test)]
#[path = "selection_tests.rs"]
mod tests;
