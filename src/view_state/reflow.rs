//! Soft-wrap computation for logical lines.
//!
//! A line is cut into sub-lines by walking it one character at a time,
//! skipping attribute codes, until the accumulated width passes the wrap
//! width. With word-wrap on, the cut moves back to the last delimiter unless
//! that is more than `wrap_limit` bytes away.
//!
//! Only the first [`RECORD_WRAPS`] continuation offsets are cached on the
//! line. Later sub-lines are recomputed from the last cached offset when
//! they are needed, which keeps the per-line footprint constant while the
//! common case (short messages) never walks at all.

use std::ops::Range;

use tracing::trace;

use super::measure::WidthMeasurer;
use crate::model::attr::{is_delimiter, AttrScanner, Token};
use crate::model::LogicalLine;

/// Number of continuation offsets cached per line.
pub const RECORD_WRAPS: usize = 4;

/// Left margin and right gutter, in measurer units.
pub const MARGIN: u32 = 2;

/// Default distance, in bytes, word-wrap may reach back for a delimiter.
pub const DEFAULT_WRAP_LIMIT: usize = 24;

/// Layout parameters shared by every line of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapParams {
    /// Right edge available for text (viewport width minus the gutter).
    /// Zero means the viewport is unusable and lines are never cut.
    pub width: u32,
    /// Break at delimiters instead of at the overflowing character.
    pub wordwrap: bool,
    /// Maximum reach back to a delimiter, in bytes.
    pub wrap_limit: usize,
    /// Left edge of continuation sub-lines.
    pub continuation_indent: u32,
}

impl WrapParams {
    /// Parameters for a viewport `viewport_width` units wide.
    pub fn for_viewport(
        viewport_width: u32,
        wordwrap: bool,
        wrap_limit: usize,
        continuation_indent: u32,
    ) -> Self {
        Self {
            width: viewport_width.saturating_sub(MARGIN),
            wordwrap,
            wrap_limit,
            continuation_indent,
        }
    }
}

/// Result of wrapping one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapLayout {
    /// Visual rows the line occupies; at least 1.
    pub sub_lines: usize,
    /// Start offsets of sub-lines `1..=RECORD_WRAPS` that exist.
    pub wraps: Vec<usize>,
}

/// Length in bytes of the segment starting at `start`, drawn from `indent`.
///
/// Always returns at least one whole character for `start < len`.
pub fn next_wrap<M: WidthMeasurer + ?Sized>(
    measurer: &M,
    line: &LogicalLine,
    start: usize,
    indent: u32,
    params: &WrapParams,
) -> usize {
    let bytes = line.bytes();
    let len = bytes.len();
    if start >= len {
        return 0;
    }
    if start == 0 && params.width >= line.width().saturating_add(line.indent()) {
        return len;
    }
    if params.width < 1 {
        return len - start;
    }

    let mut scanner = AttrScanner::new();
    let mut pos = start;
    let mut x = indent;
    let mut last_delim: Option<usize> = None;
    // attribute bytes skipped since the last delimiter
    let mut limit_offset = 0usize;
    let mut consumed_visible = false;

    while pos < len {
        let run = match scanner.classify(bytes, pos) {
            Token::Plain(n) => n,
            _ => {
                limit_offset += 1;
                pos += 1;
                continue;
            }
        };
        let run_end = pos + run;
        while pos < run_end {
            let (w, char_len) = measurer.char_width(&bytes[pos..run_end]);
            let char_len = char_len.max(1);
            x = x.saturating_add(w);
            if x > params.width {
                if !consumed_visible {
                    trace!(
                        entry = %line.id(),
                        offset = pos,
                        "character wider than viewport, forcing break"
                    );
                    return pos + char_len - start;
                }
                return break_point(bytes, start, pos, last_delim, limit_offset, params);
            }
            if is_delimiter(bytes[pos]) {
                last_delim = Some(pos);
                limit_offset = 0;
            }
            consumed_visible = true;
            pos += char_len;
        }
    }

    len - start
}

fn break_point(
    bytes: &[u8],
    start: usize,
    overflow: usize,
    last_delim: Option<usize>,
    limit_offset: usize,
    params: &WrapParams,
) -> usize {
    if params.wordwrap {
        if let Some(delim) = last_delim {
            if overflow - delim <= params.wrap_limit + limit_offset {
                let cut = if bytes[delim] == b' ' { delim + 1 } else { delim };
                if cut > start {
                    return cut - start;
                }
            }
        }
    }
    overflow - start
}

/// Wrap a whole line, caching the first continuation offsets.
pub fn compute_wraps<M: WidthMeasurer + ?Sized>(
    measurer: &M,
    line: &LogicalLine,
    params: &WrapParams,
) -> WrapLayout {
    let len = line.len();
    if len == 0
        || params.width < 1
        || params.width >= line.width().saturating_add(line.indent())
    {
        return WrapLayout {
            sub_lines: 1,
            wraps: Vec::new(),
        };
    }

    let mut wraps = Vec::with_capacity(RECORD_WRAPS);
    let mut pos = 0;
    let mut indent = line.indent();
    let mut sub_lines = 0;
    while pos < len {
        pos += next_wrap(measurer, line, pos, indent, params);
        sub_lines += 1;
        if pos < len && wraps.len() < RECORD_WRAPS {
            wraps.push(pos);
        }
        indent = params.continuation_indent;
    }

    WrapLayout { sub_lines, wraps }
}

/// Byte offset where sub-line `k` of `line` starts.
///
/// Uses the cached offsets when possible and walks forward from the last
/// cached one otherwise. `None` when the line has no such sub-line.
pub fn find_subline<M: WidthMeasurer + ?Sized>(
    measurer: &M,
    line: &LogicalLine,
    k: usize,
    params: &WrapParams,
) -> Option<usize> {
    if k == 0 {
        return Some(0);
    }
    if k >= line.sub_lines() {
        return None;
    }
    let cached = line.cached_wraps();
    if let Some(&offset) = cached.get(k - 1) {
        return Some(offset);
    }

    let mut pos = *cached.last()?;
    let mut at = cached.len();
    while pos < line.len() {
        pos += next_wrap(measurer, line, pos, params.continuation_indent, params);
        at += 1;
        if at == k {
            return (pos < line.len()).then_some(pos);
        }
    }
    None
}

/// Iterator over the byte ranges of a line's sub-lines, in order.
#[derive(Debug)]
pub struct SubLines<'a, M: WidthMeasurer + ?Sized> {
    measurer: &'a M,
    line: &'a LogicalLine,
    params: WrapParams,
    index: usize,
    pos: usize,
}

impl<'a, M: WidthMeasurer + ?Sized> SubLines<'a, M> {
    /// Walk the sub-lines of `line`.
    pub fn new(measurer: &'a M, line: &'a LogicalLine, params: &WrapParams) -> Self {
        Self {
            measurer,
            line,
            params: *params,
            index: 0,
            pos: 0,
        }
    }
}

impl<M: WidthMeasurer + ?Sized> Iterator for SubLines<'_, M> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let len = self.line.len();
        if self.index >= self.line.sub_lines() || (self.index > 0 && self.pos >= len) {
            return None;
        }
        let start = self.pos;
        let end = if self.line.sub_lines() == 1 {
            len
        } else if let Some(&cached) = self.line.cached_wraps().get(self.index) {
            cached
        } else if self.index + 1 == self.line.sub_lines() {
            len
        } else {
            let indent = if self.index == 0 {
                self.line.indent()
            } else {
                self.params.continuation_indent
            };
            start + next_wrap(self.measurer, self.line, start, indent, &self.params)
        };
        self.index += 1;
        self.pos = end;
        Some(start..end)
    }
}

#[cfg(test)]
#[path = "reflow_tests.rs"]
mod tests;
