//! Bounded, append-only store of logical lines.
//!
//! Entries live in a `VecDeque` in document order. Ids come from a sequence
//! that only ever grows, so the position of an entry is `id - first_id` and an
//! evicted or cleared id can never resolve again.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use super::measure::{text_width, WidthMeasurer};
use super::reflow::{compute_wraps, WrapParams, DEFAULT_WRAP_LIMIT, MARGIN};
use crate::model::{EntryId, LogicalLine, MarkRange};

/// An entry removed from the head of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvictedEntry {
    /// Id of the removed entry.
    pub id: EntryId,
    /// Visual lines it occupied.
    pub sub_lines: usize,
}

/// What an append did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendOutcome {
    /// Id of the new entry.
    pub id: EntryId,
    /// Visual lines the new entry occupies.
    pub sub_lines: usize,
    /// Entries evicted from the head to stay within capacity, oldest first.
    pub evicted: Vec<EvictedEntry>,
}

impl AppendOutcome {
    /// Total visual lines removed by eviction.
    pub fn evicted_lines(&self) -> usize {
        self.evicted.iter().map(|e| e.sub_lines).sum()
    }
}

/// Ordered sequence of logical lines with aggregate visual-line count.
#[derive(Debug, Clone)]
pub struct LineStore {
    entries: VecDeque<LogicalLine>,
    first_seq: u64,
    next_seq: u64,
    total_visual_lines: usize,
    capacity: usize,
    viewport_width: u32,
    indent: u32,
    plain_indent: u32,
    wordwrap: bool,
    wrap_limit: usize,
}

impl Default for LineStore {
    fn default() -> Self {
        Self::new(0)
    }
}

impl LineStore {
    /// Empty, unbounded store for a viewport `viewport_width` units wide.
    pub fn new(viewport_width: u32) -> Self {
        Self {
            entries: VecDeque::new(),
            first_seq: 0,
            next_seq: 0,
            total_visual_lines: 0,
            capacity: 0,
            viewport_width,
            indent: MARGIN,
            plain_indent: MARGIN,
            wordwrap: true,
            wrap_limit: DEFAULT_WRAP_LIMIT,
        }
    }

    /// Wrap parameters derived from the current settings.
    pub fn wrap_params(&self) -> WrapParams {
        WrapParams::for_viewport(
            self.viewport_width,
            self.wordwrap,
            self.wrap_limit,
            self.indent,
        )
    }

    /// Append a line and evict from the head while over capacity.
    ///
    /// Tabs become spaces. The indent is raised to at least [`MARGIN`]. The
    /// entry just appended is never evicted, so a single entry taller than
    /// the capacity is kept whole.
    pub fn push<M: WidthMeasurer + ?Sized>(
        &mut self,
        measurer: &M,
        mut bytes: Vec<u8>,
        indent: u32,
        left_len: Option<usize>,
        timestamp: DateTime<Utc>,
    ) -> AppendOutcome {
        for b in bytes.iter_mut().filter(|b| **b == b'\t') {
            *b = b' ';
        }

        let id = EntryId::from_seq(self.next_seq);
        self.next_seq += 1;

        let mut line = LogicalLine::new(id, bytes, timestamp);
        line.width = text_width(measurer, &line.bytes);
        line.indent = indent.max(MARGIN);
        line.left_len = left_len;
        self.layout(measurer, &mut line);

        let sub_lines = line.sub_lines;
        self.total_visual_lines += sub_lines;
        self.entries.push_back(line);
        trace!(entry = %id, sub_lines, "appended entry");

        let evicted = self.enforce_capacity();
        AppendOutcome {
            id,
            sub_lines,
            evicted,
        }
    }

    fn layout<M: WidthMeasurer + ?Sized>(&self, measurer: &M, line: &mut LogicalLine) {
        let layout = compute_wraps(measurer, line, &self.wrap_params());
        line.sub_lines = layout.sub_lines;
        line.wraps = layout.wraps;
    }

    /// Evict from the head while over capacity, keeping at least one entry.
    pub fn enforce_capacity(&mut self) -> Vec<EvictedEntry> {
        let mut evicted = Vec::new();
        while self.capacity > 0
            && self.total_visual_lines > self.capacity
            && self.entries.len() > 1
        {
            if let Some(entry) = self.evict_head() {
                evicted.push(entry);
            }
        }
        if !evicted.is_empty() {
            debug!(
                count = evicted.len(),
                total_visual_lines = self.total_visual_lines,
                capacity = self.capacity,
                "evicted entries over capacity"
            );
        }
        evicted
    }

    /// Remove the oldest entry.
    pub fn evict_head(&mut self) -> Option<EvictedEntry> {
        let line = self.entries.pop_front()?;
        self.first_seq = line.id.seq() + 1;
        self.total_visual_lines -= line.sub_lines;
        Some(EvictedEntry {
            id: line.id,
            sub_lines: line.sub_lines,
        })
    }

    /// Drop every entry. Ids issued so far stay retired.
    pub fn clear(&mut self) {
        debug!(entries = self.entries.len(), "clearing store");
        self.entries.clear();
        self.first_seq = self.next_seq;
        self.total_visual_lines = 0;
    }

    /// Recompute every entry's wraps and the visual-line total.
    pub fn reflow_all<M: WidthMeasurer + ?Sized>(&mut self, measurer: &M) {
        let params = self.wrap_params();
        let mut total = 0;
        for line in self.entries.iter_mut() {
            let layout = compute_wraps(measurer, line, &params);
            line.sub_lines = layout.sub_lines;
            line.wraps = layout.wraps;
            total += line.sub_lines;
        }
        self.total_visual_lines = total;
        debug!(
            entries = self.entries.len(),
            total_visual_lines = total,
            width = self.viewport_width,
            "reflowed store"
        );
    }

    /// Change the viewport width and reflow. Returns false if unchanged.
    pub fn resize<M: WidthMeasurer + ?Sized>(&mut self, measurer: &M, viewport_width: u32) -> bool {
        if viewport_width == self.viewport_width {
            return false;
        }
        self.viewport_width = viewport_width;
        self.reflow_all(measurer);
        true
    }

    /// Recompute text widths (optionally) and every entry's indent, then
    /// reflow.
    pub fn recalc_widths<M: WidthMeasurer + ?Sized>(&mut self, measurer: &M, text_widths: bool) {
        let space = measurer.space_width();
        let (indent, plain) = (self.indent, self.plain_indent);
        for line in self.entries.iter_mut() {
            if text_widths {
                line.width = text_width(measurer, &line.bytes);
            }
            line.indent = match line.left_len {
                Some(left_len) => {
                    let left = text_width(measurer, &line.bytes[..left_len.min(line.bytes.len())]);
                    indent.saturating_sub(left).saturating_sub(space).max(MARGIN)
                }
                None => plain,
            };
        }
        self.reflow_all(measurer);
    }

    /// Set the capacity in visual lines (0 = unbounded) and enforce it.
    pub fn set_capacity(&mut self, capacity: usize) -> Vec<EvictedEntry> {
        self.capacity = capacity;
        self.enforce_capacity()
    }

    /// Turn word-wrap on or off and reflow.
    pub fn set_wordwrap<M: WidthMeasurer + ?Sized>(&mut self, measurer: &M, wordwrap: bool) {
        if self.wordwrap != wordwrap {
            self.wordwrap = wordwrap;
            self.reflow_all(measurer);
        }
    }

    /// Change how far word-wrap may reach back, and reflow.
    pub fn set_wrap_limit<M: WidthMeasurer + ?Sized>(&mut self, measurer: &M, wrap_limit: usize) {
        if self.wrap_limit != wrap_limit {
            self.wrap_limit = wrap_limit;
            self.reflow_all(measurer);
        }
    }

    /// Set the separator column without reflowing.
    ///
    /// Callers follow up with [`LineStore::recalc_widths`].
    pub fn set_indent_raw(&mut self, indent: u32) {
        self.indent = indent.max(MARGIN);
    }

    /// Set the first-row indent of single-column entries without reflowing.
    ///
    /// Callers follow up with [`LineStore::recalc_widths`].
    pub fn set_plain_indent_raw(&mut self, indent: u32) {
        self.plain_indent = indent.max(MARGIN);
    }

    /// First-row indent of single-column entries.
    pub fn plain_indent(&self) -> u32 {
        self.plain_indent
    }

    /// Separator column; continuation sub-lines start here.
    pub fn indent(&self) -> u32 {
        self.indent
    }

    /// Capacity in visual lines.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether word-wrap is on.
    pub fn wordwrap(&self) -> bool {
        self.wordwrap
    }

    /// Word-wrap reach, in bytes.
    pub fn wrap_limit(&self) -> usize {
        self.wrap_limit
    }

    /// Viewport width in measurer units.
    pub fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    /// Sum of the sub-line counts of all entries.
    pub fn total_visual_lines(&self) -> usize {
        self.total_visual_lines
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of `id` in document order, if still present.
    pub fn index_of(&self, id: EntryId) -> Option<usize> {
        let offset = id.seq().checked_sub(self.first_seq)?;
        let index = usize::try_from(offset).ok()?;
        (index < self.entries.len()).then_some(index)
    }

    /// True when `id` names a live entry.
    pub fn contains(&self, id: EntryId) -> bool {
        self.index_of(id).is_some()
    }

    /// Entry by id.
    pub fn get(&self, id: EntryId) -> Option<&LogicalLine> {
        self.index_of(id).and_then(|i| self.entries.get(i))
    }

    pub(crate) fn get_mut(&mut self, id: EntryId) -> Option<&mut LogicalLine> {
        let index = self.index_of(id)?;
        self.entries.get_mut(index)
    }

    /// Entry by position.
    pub fn at(&self, index: usize) -> Option<&LogicalLine> {
        self.entries.get(index)
    }

    /// Oldest entry.
    pub fn first(&self) -> Option<&LogicalLine> {
        self.entries.front()
    }

    /// Newest entry.
    pub fn last(&self) -> Option<&LogicalLine> {
        self.entries.back()
    }

    /// Entries in document order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LogicalLine> + '_ {
        self.entries.iter()
    }

    /// Entries from `id` (inclusive) to the end; empty if `id` is stale.
    pub fn iter_from(&self, id: EntryId) -> impl Iterator<Item = &LogicalLine> + '_ {
        let start = self.index_of(id).unwrap_or(self.entries.len());
        self.entries.range(start..)
    }

    /// Entries from `from` to `to`, both inclusive, in document order.
    pub fn range(&self, from: EntryId, to: EntryId) -> impl Iterator<Item = &LogicalLine> + '_ {
        let bounds = match (self.index_of(from), self.index_of(to)) {
            (Some(a), Some(b)) if a <= b => a..b + 1,
            _ => 0..0,
        };
        self.entries.range(bounds)
    }

    pub(crate) fn set_mark(&mut self, id: EntryId, mark: Option<MarkRange>) -> bool {
        match self.get_mut(id) {
            Some(line) if line.mark != mark => {
                line.mark = mark;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view_state::measure::CellMeasurer;

    fn store(width: u32) -> (LineStore, CellMeasurer) {
        (LineStore::new(width), CellMeasurer::new())
    }

    fn push(s: &mut LineStore, m: &CellMeasurer, text: &str) -> AppendOutcome {
        s.push(m, text.as_bytes().to_vec(), 0, None, Utc::now())
    }

    #[test]
    fn append_accumulates_visual_lines() {
        let (mut s, m) = store(12);
        for _ in 0..5 {
            push(&mut s, &m, "abcdefghij");
        }
        assert_eq!(s.len(), 5);
        assert!(s.iter().all(|l| l.sub_lines() == 2));
        assert_eq!(s.total_visual_lines(), 10);
    }

    #[test]
    fn capacity_evicts_oldest_entries() {
        let (mut s, m) = store(80);
        s.set_capacity(3);
        let ids: Vec<EntryId> = (1..=5).map(|i| push(&mut s, &m, &format!("line {i}")).id).collect();

        assert_eq!(s.len(), 3);
        assert_eq!(s.total_visual_lines(), 3);
        let remaining: Vec<String> = s.iter().map(|l| l.plain_text()).collect();
        assert_eq!(remaining, vec!["line 3", "line 4", "line 5"]);
        assert!(!s.contains(ids[0]));
        assert!(!s.contains(ids[1]));
        assert_eq!(s.first().map(|l| l.id()), Some(ids[2]));
    }

    #[test]
    fn append_reports_evictions() {
        let (mut s, m) = store(80);
        s.set_capacity(2);
        push(&mut s, &m, "a");
        push(&mut s, &m, "b");
        let outcome = push(&mut s, &m, "c");
        assert_eq!(outcome.evicted.len(), 1);
        assert_eq!(outcome.evicted_lines(), 1);
    }

    #[test]
    fn oversized_entry_is_never_self_evicted() {
        let (mut s, m) = store(12);
        s.set_capacity(2);
        push(&mut s, &m, "short");
        let outcome = push(&mut s, &m, &"x".repeat(32));
        assert_eq!(outcome.sub_lines, 4);
        assert_eq!(s.len(), 1);
        assert_eq!(s.total_visual_lines(), 4);
        assert!(s.contains(outcome.id));
    }

    #[test]
    fn shrinking_capacity_evicts_immediately() {
        let (mut s, m) = store(80);
        for i in 0..6 {
            push(&mut s, &m, &format!("{i}"));
        }
        let evicted = s.set_capacity(4);
        assert_eq!(evicted.len(), 2);
        assert_eq!(s.total_visual_lines(), 4);
    }

    #[test]
    fn ids_are_not_reused_after_clear() {
        let (mut s, m) = store(80);
        let old = push(&mut s, &m, "before").id;
        s.clear();
        assert!(s.is_empty());
        assert_eq!(s.total_visual_lines(), 0);
        let new = push(&mut s, &m, "after").id;
        assert!(new > old);
        assert!(s.get(old).is_none());
        assert_eq!(s.index_of(new), Some(0));
    }

    #[test]
    fn tabs_become_spaces_and_indent_has_margin() {
        let (mut s, m) = store(80);
        let id = push(&mut s, &m, "a\tb").id;
        let line = s.get(id).unwrap();
        assert_eq!(line.bytes(), b"a b");
        assert_eq!(line.indent(), MARGIN);
    }

    #[test]
    fn resize_reflows_everything() {
        let (mut s, m) = store(80);
        for _ in 0..3 {
            push(&mut s, &m, "abcdefghij");
        }
        assert_eq!(s.total_visual_lines(), 3);
        assert!(s.resize(&m, 12));
        assert_eq!(s.total_visual_lines(), 6);
        assert!(!s.resize(&m, 12));
        assert!(s.resize(&m, 80));
        assert_eq!(s.total_visual_lines(), 3);
    }

    #[test]
    fn wordwrap_toggle_reflows() {
        let (mut s, m) = store(15);
        let id = push(&mut s, &m, "hello world foo").id;
        assert_eq!(s.get(id).unwrap().cached_wraps(), &[6]);
        s.set_wordwrap(&m, false);
        assert_eq!(s.get(id).unwrap().cached_wraps(), &[11]);
    }

    #[test]
    fn range_is_inclusive_and_ordered() {
        let (mut s, m) = store(80);
        let ids: Vec<EntryId> = (0..4).map(|i| push(&mut s, &m, &format!("{i}")).id).collect();
        let texts: Vec<String> = s.range(ids[1], ids[2]).map(|l| l.plain_text()).collect();
        assert_eq!(texts, vec!["1", "2"]);
        assert_eq!(s.range(ids[2], ids[1]).count(), 0);
    }

    #[test]
    fn recalc_widths_repositions_two_column_entries() {
        let (mut s, m) = store(80);
        s.set_indent_raw(10);
        let id = s
            .push(&m, b"nick hello".to_vec(), 5, Some(4), Utc::now())
            .id;
        s.set_indent_raw(20);
        s.recalc_widths(&m, false);
        // separator at 20, minus "nick" and one space
        assert_eq!(s.get(id).unwrap().indent(), 15);
    }

    #[test]
    fn recalc_widths_moves_single_column_entries_to_plain_indent() {
        let (mut s, m) = store(80);
        let plain = push(&mut s, &m, "plain").id;
        s.set_plain_indent_raw(13);
        s.recalc_widths(&m, false);
        assert_eq!(s.get(plain).unwrap().indent(), 13);
        s.set_plain_indent_raw(0);
        s.recalc_widths(&m, false);
        assert_eq!(s.get(plain).unwrap().indent(), MARGIN);
    }
}
