//! The scrollback: store, page index, selection and scroll position behind
//! one owner.
//!
//! `Scrollback` is the surface front ends talk to. It keeps the derived
//! pieces (page-top cache, selection marks, scroll value) consistent with the
//! store across appends, evictions, reflows and clears, so none of them can
//! point at an entry that is gone.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, trace};

use super::hit_test::{self, Hit, Word};
use super::measure::{text_width, WidthMeasurer};
use super::options::ScrollbackOptions;
use super::reflow::MARGIN;
use super::renderer::{stamp_width, PaintSink, Renderer};
use super::search::{self, SearchHit};
use super::selection::{RenderRequest, SelectionModel, SelectionRange, TextPosition};
use super::store::{AppendOutcome, EvictedEntry, LineStore};
use super::viewport::{Location, ViewportIndex};
use crate::model::attr::strip_attributes;
use crate::model::{EngineError, EntryId, LogicalLine};

/// One line of `export_jsonl` output.
#[derive(Debug, Serialize)]
struct ExportRecord<'a> {
    timestamp: DateTime<Utc>,
    text: &'a str,
}

/// Bounded scrollback of attribute-coded lines.
#[derive(Debug)]
pub struct Scrollback<M: WidthMeasurer> {
    measurer: M,
    store: LineStore,
    index: ViewportIndex,
    selection: SelectionModel,
    scroll: usize,
    page_rows: usize,
    stick_to_bottom: bool,
    auto_indent: bool,
    max_auto_indent: u32,
    time_stamp: bool,
    color_paste: bool,
    last_match: Option<EntryId>,
    repaint: Vec<RenderRequest>,
}

impl<M: WidthMeasurer> Scrollback<M> {
    /// Empty scrollback for a viewport `viewport_width` units wide.
    pub fn new(measurer: M, viewport_width: u32, options: ScrollbackOptions) -> Self {
        let mut store = LineStore::new(viewport_width);
        store.set_capacity(options.capacity);
        store.set_wordwrap(&measurer, options.wordwrap);
        store.set_wrap_limit(&measurer, options.wrap_limit);
        store.set_indent_raw(options.indent);

        let mut scrollback = Self {
            measurer,
            store,
            index: ViewportIndex::new(),
            selection: SelectionModel::new(),
            scroll: 0,
            page_rows: 0,
            stick_to_bottom: true,
            auto_indent: options.auto_indent,
            max_auto_indent: options.max_auto_indent,
            time_stamp: options.time_stamp,
            color_paste: options.color_paste,
            last_match: None,
            repaint: Vec::new(),
        };
        let plain = scrollback.plain_indent();
        scrollback.store.set_plain_indent_raw(plain);
        scrollback
    }

    // ===== Appending =====

    /// Append a single-column line. One trailing `\n` is dropped.
    pub fn append(&mut self, text: impl Into<Vec<u8>>) -> EntryId {
        self.append_at(text, Utc::now())
    }

    /// [`Scrollback::append`] with an explicit time stamp.
    pub fn append_at(&mut self, text: impl Into<Vec<u8>>, timestamp: DateTime<Utc>) -> EntryId {
        let mut bytes = text.into();
        strip_newline(&mut bytes);
        let indent = self.store.plain_indent();
        let outcome = self
            .store
            .push(&self.measurer, bytes, indent, None, timestamp);
        self.after_append(outcome)
    }

    /// Append a two-column line: `left` is right-aligned against the
    /// separator column and `right` starts at it.
    pub fn append_indent(&mut self, left: &[u8], right: &[u8]) -> EntryId {
        self.append_indent_at(left, right, Utc::now())
    }

    /// [`Scrollback::append_indent`] with an explicit time stamp.
    pub fn append_indent_at(
        &mut self,
        left: &[u8],
        right: &[u8],
        timestamp: DateTime<Utc>,
    ) -> EntryId {
        let right = right.strip_suffix(b"\n").unwrap_or(right);
        let space = self.measurer.space_width();
        let left_width = text_width(&self.measurer, left);
        let stamp = if self.time_stamp {
            stamp_width(&self.measurer)
        } else {
            0
        };

        let mut indent = self
            .store
            .indent()
            .saturating_sub(left_width)
            .saturating_sub(space);
        if self.auto_indent && indent < MARGIN + stamp {
            self.widen_separator(MARGIN + stamp + space + left_width);
            indent = self
                .store
                .indent()
                .saturating_sub(left_width)
                .saturating_sub(space);
        }

        let mut bytes = Vec::with_capacity(left.len() + 1 + right.len());
        bytes.extend_from_slice(left);
        bytes.push(b' ');
        bytes.extend_from_slice(right);
        let outcome = self
            .store
            .push(&self.measurer, bytes, indent, Some(left.len()), timestamp);
        self.after_append(outcome)
    }

    /// Move the separator so a left column of `wanted` units fits.
    fn widen_separator(&mut self, wanted: u32) {
        let current = self.store.indent();
        let capped = current.max(wanted).min(self.max_auto_indent);
        let separator = round_up(capped, self.measurer.space_width());
        if separator == current {
            return;
        }
        debug!(from = current, to = separator, "auto-indent moved separator");
        self.store.set_indent_raw(separator);
        self.store.recalc_widths(&self.measurer, false);
        self.after_reflow();
    }

    fn after_append(&mut self, outcome: AppendOutcome) -> EntryId {
        self.absorb_evictions(&outcome.evicted);
        outcome.id
    }

    /// Shift the page top, selection and scroll past evicted entries.
    fn absorb_evictions(&mut self, evicted: &[EvictedEntry]) {
        let mut evicted_lines = 0;
        for entry in evicted {
            self.index.on_evicted(entry);
            let requests = self.selection.on_evicted(&mut self.store, entry.id);
            self.repaint.extend(requests);
            if self.last_match == Some(entry.id) {
                self.last_match = None;
            }
            evicted_lines += entry.sub_lines;
        }
        if evicted_lines > 0 {
            self.scroll = self.scroll.saturating_sub(evicted_lines);
            trace!(evicted_lines, scroll = self.scroll, "shifted scroll after eviction");
        }
        self.settle_scroll();
    }

    /// Wraps changed: drop the page top and trim back to capacity.
    fn after_reflow(&mut self) {
        self.index.invalidate();
        let evicted = self.store.enforce_capacity();
        self.absorb_evictions(&evicted);
    }

    /// Follow the bottom when sticking, clamp otherwise.
    fn settle_scroll(&mut self) {
        if self.stick_to_bottom {
            self.scroll = self.max_scroll();
        } else {
            self.scroll = self.scroll.min(self.max_scroll());
        }
    }

    /// Drop every entry and the selection.
    pub fn clear(&mut self) {
        self.store.clear();
        self.selection.forget();
        self.index.invalidate();
        self.scroll = 0;
        self.last_match = None;
        self.repaint.clear();
    }

    // ===== Geometry =====

    /// Change the viewport width. Returns false when nothing changed.
    pub fn resize(&mut self, viewport_width: u32) -> bool {
        if !self.store.resize(&self.measurer, viewport_width) {
            return false;
        }
        debug!(
            width = viewport_width,
            total_visual_lines = self.store.total_visual_lines(),
            "resized scrollback"
        );
        self.after_reflow();
        true
    }

    /// Set how many rows a page shows.
    pub fn set_page_rows(&mut self, rows: usize) {
        self.page_rows = rows;
        self.settle_scroll();
    }

    /// Rows per page.
    pub fn page_rows(&self) -> usize {
        self.page_rows
    }

    /// Re-measure every entry, e.g. after the font changed.
    pub fn recalc_widths(&mut self) {
        self.store.recalc_widths(&self.measurer, true);
        self.after_reflow();
    }

    /// Swap the width measurer and re-measure everything.
    pub fn set_measurer(&mut self, measurer: M) {
        self.measurer = measurer;
        let plain = self.plain_indent();
        self.store.set_plain_indent_raw(plain);
        self.recalc_widths();
    }

    /// The width measurer in use.
    pub fn measurer(&self) -> &M {
        &self.measurer
    }

    fn plain_indent(&self) -> u32 {
        if self.time_stamp {
            MARGIN + stamp_width(&self.measurer)
        } else {
            MARGIN
        }
    }

    // ===== Settings =====

    /// Set the capacity in visual lines (0 = unbounded).
    pub fn set_capacity(&mut self, capacity: usize) {
        let evicted = self.store.set_capacity(capacity);
        self.absorb_evictions(&evicted);
    }

    /// Turn word-wrap on or off.
    pub fn set_wordwrap(&mut self, wordwrap: bool) {
        if self.store.wordwrap() != wordwrap {
            self.store.set_wordwrap(&self.measurer, wordwrap);
            self.after_reflow();
        }
    }

    /// Change the word-wrap reach.
    pub fn set_wrap_limit(&mut self, wrap_limit: usize) {
        if self.store.wrap_limit() != wrap_limit {
            self.store.set_wrap_limit(&self.measurer, wrap_limit);
            self.after_reflow();
        }
    }

    /// Move the separator column and re-indent two-column entries.
    pub fn set_indent(&mut self, indent: u32) {
        self.store.set_indent_raw(indent);
        self.store.recalc_widths(&self.measurer, false);
        self.after_reflow();
    }

    /// Show or hide time stamps. Single-column entries move to make room.
    pub fn set_time_stamp(&mut self, time_stamp: bool) {
        if self.time_stamp == time_stamp {
            return;
        }
        self.time_stamp = time_stamp;
        let plain = self.plain_indent();
        self.store.set_plain_indent_raw(plain);
        self.store.recalc_widths(&self.measurer, false);
        self.after_reflow();
    }

    /// Enable or disable auto-indent.
    pub fn set_auto_indent(&mut self, auto_indent: bool) {
        self.auto_indent = auto_indent;
    }

    /// Limit for auto-indent.
    pub fn set_max_auto_indent(&mut self, max_auto_indent: u32) {
        self.max_auto_indent = max_auto_indent;
    }

    /// Copy selections with `%C`-style codes.
    pub fn set_color_paste(&mut self, color_paste: bool) {
        self.color_paste = color_paste;
    }

    /// Whether word-wrap is on.
    pub fn wordwrap(&self) -> bool {
        self.store.wordwrap()
    }

    /// Whether time stamps are shown.
    pub fn time_stamp(&self) -> bool {
        self.time_stamp
    }

    /// Separator column.
    pub fn indent(&self) -> u32 {
        self.store.indent()
    }

    // ===== Lookup =====

    /// The underlying store.
    pub fn store(&self) -> &LineStore {
        &self.store
    }

    /// Resolve an absolute visual line.
    pub fn locate(&self, line: usize) -> Option<Location> {
        self.index.locate(&self.store, line)
    }

    /// [`Scrollback::locate`] reporting why a line does not resolve.
    pub fn locate_checked(&self, line: usize) -> Result<Location, EngineError> {
        self.locate(line).ok_or(EngineError::OutOfRange {
            line,
            total: self.store.total_visual_lines(),
        })
    }

    /// Entry by id, or `StaleEntry` when it was evicted or cleared.
    pub fn entry_checked(&self, id: EntryId) -> Result<&LogicalLine, EngineError> {
        self.store.get(id).ok_or(EngineError::StaleEntry(id))
    }

    /// First visual line of `id`.
    pub fn line_of(&self, id: EntryId) -> Option<usize> {
        self.index.line_of(&self.store, id)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// True when nothing has been appended since the last clear.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Visual lines across all entries.
    pub fn total_visual_lines(&self) -> usize {
        self.store.total_visual_lines()
    }

    /// Visit the raw bytes of every entry in order.
    pub fn for_each<F: FnMut(&[u8])>(&self, mut f: F) {
        for line in self.store.iter() {
            f(line.bytes());
        }
    }

    // ===== Scrolling =====

    /// Top visual line of the page.
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Largest valid scroll value.
    pub fn max_scroll(&self) -> usize {
        self.store.total_visual_lines().saturating_sub(self.page_rows)
    }

    /// True when the last row is on the page.
    pub fn is_at_bottom(&self) -> bool {
        self.scroll >= self.max_scroll()
    }

    /// Scroll so `line` is the top row, clamped.
    pub fn scroll_to(&mut self, line: usize) {
        self.scroll = line.min(self.max_scroll());
        self.stick_to_bottom = self.is_at_bottom();
    }

    /// Scroll by `delta` rows, clamped.
    pub fn scroll_by(&mut self, delta: isize) {
        let target = self.scroll.saturating_add_signed(delta);
        self.scroll_to(target);
    }

    /// Show the last page and follow new output.
    pub fn scroll_to_bottom(&mut self) {
        self.scroll = self.max_scroll();
        self.stick_to_bottom = true;
    }

    /// Whether new output scrolls the page.
    pub fn stick_to_bottom(&self) -> bool {
        self.stick_to_bottom
    }

    /// Follow new output or stay put.
    pub fn set_stick_to_bottom(&mut self, stick: bool) {
        self.stick_to_bottom = stick;
        self.settle_scroll();
    }

    // ===== Selection and search =====

    /// Select from `anchor` to `active`; returns the spans to repaint.
    pub fn set_selection(&mut self, anchor: TextPosition, active: TextPosition) -> Vec<RenderRequest> {
        self.selection.set_range(&mut self.store, anchor, active)
    }

    /// Remove the selection; returns the spans to repaint.
    pub fn clear_selection(&mut self) -> Vec<RenderRequest> {
        self.selection.clear(&mut self.store)
    }

    /// Current selection, normalized.
    pub fn selection(&self) -> Option<SelectionRange> {
        self.selection.range()
    }

    /// Selected text in document order, one entry per line.
    pub fn selection_text(&self) -> Option<String> {
        self.selection.text(&self.store, self.color_paste)
    }

    /// Find `pattern` after the previous match and select it.
    pub fn find_next(&mut self, pattern: &[u8]) -> Option<SearchHit> {
        self.find_next_from(pattern, self.last_match)
    }

    /// Find `pattern` in the entries after `start` and select it.
    ///
    /// The previous selection is cleared first. The page scrolls so the match
    /// is visible. A miss resets the search to start from the head next time.
    /// The highlight changes are queued for [`Scrollback::take_repaint`].
    pub fn find_next_from(&mut self, pattern: &[u8], start: Option<EntryId>) -> Option<SearchHit> {
        let cleared = self.selection.clear(&mut self.store);
        self.repaint.extend(cleared);
        let Some(hit) = search::find_next(&self.store, pattern, start) else {
            self.last_match = None;
            return None;
        };
        self.last_match = Some(hit.entry);
        let marked = self.selection.set_range(
            &mut self.store,
            TextPosition::new(hit.entry, hit.bytes.start),
            TextPosition::new(hit.entry, hit.bytes.end),
        );
        self.repaint.extend(marked);
        if let Some(line) = self.line_of(hit.entry) {
            if line < self.scroll || line >= self.scroll + self.page_rows.max(1) {
                self.scroll_to(line);
            }
        }
        trace!(entry = %hit.entry, start = hit.bytes.start, "search matched");
        Some(hit)
    }

    // ===== Rendering and pointer =====

    /// Paint the current page. Queued repaints are covered by this.
    pub fn render_page<S: PaintSink>(&mut self, sink: &mut S) -> usize {
        self.repaint.clear();
        Renderer::new(&self.measurer, &self.store, self.stamps_painted()).render_page(
            &mut self.index,
            self.scroll,
            self.page_rows,
            sink,
        )
    }

    /// Repaint only `requests` on the page painted last.
    pub fn render_requests<S: PaintSink>(&self, requests: &[RenderRequest], sink: &mut S) -> usize {
        Renderer::new(&self.measurer, &self.store, self.stamps_painted()).render_requests(
            &self.index,
            self.page_rows,
            requests,
            sink,
        )
    }

    /// Spans whose highlight changed as a side effect of appends, reflows
    /// and searches since the last call or the last full render.
    ///
    /// Feed them to [`Scrollback::render_requests`].
    pub fn take_repaint(&mut self) -> Vec<RenderRequest> {
        std::mem::take(&mut self.repaint)
    }

    // stamps share the margin with the left column, which only auto-indent
    // keeps clear
    fn stamps_painted(&self) -> bool {
        self.time_stamp && self.auto_indent
    }

    /// Entry and byte offset under column `x` of page row `row`.
    pub fn hit_test(&self, x: u32, row: usize) -> Option<Hit> {
        hit_test::hit_test(&self.measurer, &self.store, &self.index, self.scroll, x, row)
    }

    /// Word under column `x` of page row `row`.
    pub fn word_at(&self, x: u32, row: usize) -> Option<Word> {
        hit_test::word_at(&self.measurer, &self.store, &self.index, self.scroll, x, row)
    }

    // ===== Export =====

    /// Write every entry with codes stripped, one newline-terminated line each.
    pub fn export_plain<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for line in self.store.iter() {
            writer.write_all(&strip_attributes(line.bytes()))?;
            writer.write_all(b"\n")?;
        }
        writer.flush()
    }

    /// Write one JSON object per entry: `timestamp` (RFC 3339) and `text`.
    pub fn export_jsonl<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for line in self.store.iter() {
            let text = line.plain_text();
            let record = ExportRecord {
                timestamp: line.timestamp(),
                text: &text,
            };
            serde_json::to_writer(&mut writer, &record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()
    }
}

fn strip_newline(bytes: &mut Vec<u8>) {
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }
}

/// Round `value` up to a multiple of `step`.
fn round_up(value: u32, step: u32) -> u32 {
    if step == 0 {
        value
    } else {
        value.div_ceil(step) * step
    }
}

#[cfg(test)]
#[path = "scrollback_tests.rs"]
mod tests;
