//! Width measurement capability.
//!
//! The engine never knows about fonts or cells. Everything that needs a width
//! asks a [`WidthMeasurer`]; the TUI plugs in [`CellMeasurer`].

use unicode_width::UnicodeWidthChar;

use crate::model::attr::{
    is_attr_byte, is_multibyte, strip_attributes, AttrScanner, Token, Tokens,
};

/// Measures the on-screen width of text.
///
/// Implementations must be deterministic: the same bytes always measure the
/// same, otherwise cached wraps drift from what is painted.
pub trait WidthMeasurer {
    /// Width of a run of displayable bytes (no attribute codes).
    fn measure(&self, text: &[u8], is_multibyte: bool) -> u32;

    /// Width and byte length of the character starting at `bytes[0]`.
    ///
    /// Returns a byte length of at least 1 for non-empty input.
    fn char_width(&self, bytes: &[u8]) -> (u32, usize);

    /// Width of one space.
    fn space_width(&self) -> u32 {
        self.char_width(b" ").0
    }
}

/// Terminal-cell measurer backed by `unicode-width`.
///
/// `cell_width` scales every column, which lets tests use round numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellMeasurer {
    cell_width: u32,
}

impl Default for CellMeasurer {
    fn default() -> Self {
        Self { cell_width: 1 }
    }
}

impl CellMeasurer {
    /// One unit per terminal column.
    pub fn new() -> Self {
        Self::default()
    }

    /// `cell_width` units per terminal column.
    pub fn with_cell_width(cell_width: u32) -> Self {
        Self {
            cell_width: cell_width.max(1),
        }
    }

    /// Units per column.
    pub fn cell_width(&self) -> u32 {
        self.cell_width
    }
}

impl WidthMeasurer for CellMeasurer {
    fn measure(&self, text: &[u8], _is_multibyte: bool) -> u32 {
        let mut pos = 0;
        let mut width = 0;
        while pos < text.len() {
            let (w, len) = self.char_width(&text[pos..]);
            width += w;
            pos += len;
        }
        width
    }

    fn char_width(&self, bytes: &[u8]) -> (u32, usize) {
        let Some(&lead) = bytes.first() else {
            return (0, 0);
        };
        let len = utf8_char_len(lead).min(bytes.len());
        match std::str::from_utf8(&bytes[..len])
            .ok()
            .and_then(|s| s.chars().next())
        {
            Some(ch) if ch.is_control() => (0, len),
            Some(ch) => (ch.width().unwrap_or(0) as u32 * self.cell_width, len),
            // invalid sequence: one replacement cell per byte
            None => (self.cell_width, 1),
        }
    }
}

/// Expected length of a UTF-8 sequence from its lead byte.
///
/// Continuation and invalid lead bytes count as a single byte.
pub fn utf8_char_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => 1,
    }
}

/// Width of `bytes` with attribute codes ignored.
pub fn text_width<M: WidthMeasurer + ?Sized>(measurer: &M, bytes: &[u8]) -> u32 {
    let multibyte = is_multibyte(bytes);
    if !bytes.iter().any(|&b| is_attr_byte(b)) {
        return measurer.measure(bytes, multibyte);
    }
    measurer.measure(&strip_attributes(bytes), multibyte)
}

/// Width of the displayable bytes in `bytes[start..end]`, honoring a color
/// code already in progress at `start`.
pub fn span_width<M: WidthMeasurer + ?Sized>(
    measurer: &M,
    bytes: &[u8],
    start: usize,
    end: usize,
    scanner: AttrScanner,
) -> u32 {
    let multibyte = is_multibyte(bytes);
    Tokens::resume(bytes, start, end, scanner)
        .filter_map(|(at, token)| match token {
            Token::Plain(n) => Some(measurer.measure(&bytes[at..at + n], multibyte)),
            _ => None,
        })
        .sum()
}
