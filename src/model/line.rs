//! Logical line entries.
//!
//! A [`LogicalLine`] is one appended unit of text (one chat message). Its bytes
//! never change after append; only the wrap cache, the sub-line count and the
//! selection mark are updated by the owning store.

use chrono::{DateTime, Utc};

use super::attr::{is_multibyte, strip_attributes};
use super::EntryId;

/// Selected byte range `[start, end)` within one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkRange {
    /// First selected byte.
    pub start: usize,
    /// One past the last selected byte.
    pub end: usize,
}

impl MarkRange {
    /// Range covering `[start, end)`; the bounds are ordered if reversed.
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    /// True when `offset` falls inside the range.
    pub fn contains(&self, offset: usize) -> bool {
        (self.start..self.end).contains(&offset)
    }

    /// True when no byte is selected.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// One appended line and its cached layout.
#[derive(Debug, Clone)]
pub struct LogicalLine {
    pub(crate) id: EntryId,
    pub(crate) bytes: Vec<u8>,
    pub(crate) multibyte: bool,
    pub(crate) width: u32,
    pub(crate) indent: u32,
    pub(crate) left_len: Option<usize>,
    pub(crate) wraps: Vec<usize>,
    pub(crate) sub_lines: usize,
    pub(crate) mark: Option<MarkRange>,
    pub(crate) timestamp: DateTime<Utc>,
}

impl LogicalLine {
    pub(crate) fn new(id: EntryId, bytes: Vec<u8>, timestamp: DateTime<Utc>) -> Self {
        let multibyte = is_multibyte(&bytes);
        Self {
            id,
            bytes,
            multibyte,
            width: 0,
            indent: 0,
            left_len: None,
            wraps: Vec::new(),
            sub_lines: 1,
            mark: None,
            timestamp,
        }
    }

    /// Identifier assigned at append.
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// Raw bytes including attribute codes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True for an entry with no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether any byte is outside ASCII.
    pub fn is_multibyte(&self) -> bool {
        self.multibyte
    }

    /// Display width with attribute codes ignored.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Left edge of the first sub-line.
    pub fn indent(&self) -> u32 {
        self.indent
    }

    /// Byte length of the left column for two-column entries.
    pub fn left_len(&self) -> Option<usize> {
        self.left_len
    }

    /// Start offsets of the first few continuation sub-lines.
    pub fn cached_wraps(&self) -> &[usize] {
        &self.wraps
    }

    /// Number of visual rows at the current viewport width.
    pub fn sub_lines(&self) -> usize {
        self.sub_lines
    }

    /// Current selection mark, if any.
    pub fn mark(&self) -> Option<MarkRange> {
        self.mark
    }

    /// Creation time.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Bytes with attribute codes removed, decoded lossily.
    pub fn plain_text(&self) -> String {
        String::from_utf8_lossy(&strip_attributes(&self.bytes)).into_owned()
    }
}
