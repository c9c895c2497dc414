//! Painting visible sub-lines through a [`PaintSink`].
//!
//! The renderer walks entries from the page top, cuts each sub-line into
//! style runs (at attribute codes, selection edges and requested byte range
//! edges) and hands every run to the sink. Runs outside a requested range are
//! measured but not painted, so partial repaints land at the right column.

use std::ops::Range;

use chrono::{DateTime, Local, Utc};
use tracing::trace;

use super::measure::WidthMeasurer;
use super::reflow::{SubLines, WrapParams, MARGIN};
use super::selection::RenderRequest;
use super::store::LineStore;
use super::viewport::ViewportIndex;
use crate::model::attr::{AttrScanner, AttrState, TextStyle, Token, Tokens};
use crate::model::{LogicalLine, MarkRange};

/// Paint capability supplied by the front end.
pub trait PaintSink {
    /// Paint `text` (no attribute codes) at column `x` of `row`.
    ///
    /// Returns the width painted, in measurer units.
    fn draw_run(&mut self, x: u32, row: usize, text: &[u8], selected: bool, style: &TextStyle) -> u32;

    /// Blank a row before it is repainted in full.
    fn clear_row(&mut self, _row: usize) {}
}

/// Time stamp shown at the left margin, `[HH:MM:SS] ` in local time.
pub fn stamp_text(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("[%H:%M:%S] ")
        .to_string()
}

/// Width of a time stamp under `measurer`.
pub fn stamp_width<M: WidthMeasurer + ?Sized>(measurer: &M) -> u32 {
    measurer.measure(b"[00:00:00] ", false)
}

/// One rendering pass over a store.
#[derive(Debug)]
pub struct Renderer<'a, M: WidthMeasurer + ?Sized> {
    measurer: &'a M,
    store: &'a LineStore,
    params: WrapParams,
    time_stamp: bool,
}

impl<'a, M: WidthMeasurer + ?Sized> Renderer<'a, M> {
    /// Renderer for `store`, drawing time stamps when `time_stamp` is set.
    pub fn new(measurer: &'a M, store: &'a LineStore, time_stamp: bool) -> Self {
        Self {
            measurer,
            store,
            params: store.wrap_params(),
            time_stamp,
        }
    }

    /// Repaint `rows` rows starting at visual line `top_line`.
    ///
    /// Caches the page top in `index`. Rows past the end of the store are
    /// cleared. Returns the number of rows that show text.
    pub fn render_page<S: PaintSink>(
        &self,
        index: &mut ViewportIndex,
        top_line: usize,
        rows: usize,
        sink: &mut S,
    ) -> usize {
        let mut row = 0;
        if let Some(top) = index.set_page_top(self.store, top_line) {
            let mut skip = top.sub_line;
            for line in self.store.iter_from(top.entry) {
                if row >= rows {
                    break;
                }
                row += self.paint_entry(line, skip, row, rows, None, sink);
                skip = 0;
            }
        }
        let filled = row;
        for blank in row..rows {
            sink.clear_row(blank);
        }
        trace!(top_line, rows, filled, "rendered page");
        filled
    }

    /// Repaint only the requested byte spans that are on the current page.
    ///
    /// Needs a page top cached by [`Renderer::render_page`]; without one
    /// nothing is painted. Returns the number of rows touched.
    pub fn render_requests<S: PaintSink>(
        &self,
        index: &ViewportIndex,
        rows: usize,
        requests: &[RenderRequest],
        sink: &mut S,
    ) -> usize {
        let Some(top) = index.page_top() else {
            return 0;
        };
        let mut touched = 0;
        for request in requests {
            let Some(line) = self.store.get(request.entry) else {
                continue;
            };
            let Some(first) = index.line_of(self.store, request.entry) else {
                continue;
            };
            if first >= top.line + rows || first + line.sub_lines() <= top.line {
                continue;
            }
            let skip = top.line.saturating_sub(first);
            let start_row = first.saturating_sub(top.line);
            touched += self.paint_entry(line, skip, start_row, rows, Some(&request.bytes), sink);
        }
        touched
    }

    /// Paint sub-lines of `line` from `skip` on, starting at `row`.
    fn paint_entry<S: PaintSink>(
        &self,
        line: &LogicalLine,
        skip: usize,
        mut row: usize,
        rows: usize,
        clip: Option<&Range<usize>>,
        sink: &mut S,
    ) -> usize {
        let mut state = AttrState::new();
        let mut painted = 0;
        for (k, range) in SubLines::new(self.measurer, line, &self.params).enumerate() {
            if k < skip {
                advance(line.bytes(), range, &mut state);
                continue;
            }
            if row >= rows {
                break;
            }
            let indent = if k == 0 {
                line.indent()
            } else {
                self.params.continuation_indent
            };
            if clip.is_none() {
                sink.clear_row(row);
                if k == 0 && self.time_stamp {
                    let stamp = stamp_text(line.timestamp());
                    sink.draw_run(MARGIN, row, stamp.as_bytes(), false, &TextStyle::default());
                }
            }
            self.paint_sub_line(line, range, indent, row, &mut state, clip, sink);
            row += 1;
            painted += 1;
        }
        painted
    }

    #[allow(clippy::too_many_arguments)]
    fn paint_sub_line<S: PaintSink>(
        &self,
        line: &LogicalLine,
        range: Range<usize>,
        indent: u32,
        row: usize,
        state: &mut AttrState,
        clip: Option<&Range<usize>>,
        sink: &mut S,
    ) {
        let bytes = line.bytes();
        let mark = line.mark();
        let mut x = indent;
        for (at, token) in Tokens::resume(bytes, range.start, range.end, AttrScanner::new()) {
            state.apply(token);
            let Token::Plain(n) = token else {
                continue;
            };
            let style = state.style();
            for piece in split_run(at..at + n, mark, clip) {
                let text = &bytes[piece.clone()];
                let visible = clip.is_none_or(|c| c.start <= piece.start && piece.end <= c.end);
                if visible {
                    let selected = mark.is_some_and(|m| m.contains(piece.start));
                    x += sink.draw_run(x, row, text, selected, &style);
                } else {
                    x += self.measurer.measure(text, line.is_multibyte());
                }
            }
        }
    }
}

/// Fold the attribute codes of a skipped sub-line into `state`.
fn advance(bytes: &[u8], range: Range<usize>, state: &mut AttrState) {
    for (_, token) in Tokens::resume(bytes, range.start, range.end, AttrScanner::new()) {
        state.apply(token);
    }
}

/// Cut `run` at the selection and clip edges that fall inside it.
fn split_run(run: Range<usize>, mark: Option<MarkRange>, clip: Option<&Range<usize>>) -> Vec<Range<usize>> {
    let mut cuts: Vec<usize> = Vec::with_capacity(4);
    if let Some(m) = mark {
        cuts.extend([m.start, m.end]);
    }
    if let Some(c) = clip {
        cuts.extend([c.start, c.end]);
    }
    cuts.retain(|&c| run.start < c && c < run.end);
    cuts.sort_unstable();
    cuts.dedup();

    let mut pieces = Vec::with_capacity(cuts.len() + 1);
    let mut start = run.start;
    for cut in cuts {
        pieces.push(start..cut);
        start = cut;
    }
    pieces.push(start..run.end);
    pieces
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
