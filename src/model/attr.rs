//! Inline attribute codes (mIRC style).
//!
//! Text carries its own formatting as control bytes: a color marker followed
//! by up to two foreground digits and optionally `,` plus up to two background
//! digits, and single-byte toggles for bold, underline and reverse video.
//!
//! [`AttrScanner`] classifies positions; [`AttrState`] folds the resulting
//! tokens into a [`TextStyle`]. Color codes stay in effect until the end of the
//! logical line, so callers thread one `AttrState` across all sub-lines.

/// Toggle bold.
pub const ATTR_BOLD: u8 = 0x02;
/// Start a color code.
pub const ATTR_COLOR: u8 = 0x03;
/// Terminal bell; elided.
pub const ATTR_BEEP: u8 = 0x07;
/// Reset all attributes.
pub const ATTR_RESET: u8 = 0x0f;
/// Toggle reverse video.
pub const ATTR_REVERSE: u8 = 0x16;
/// Toggle underline.
pub const ATTR_UNDERLINE: u8 = 0x1f;

/// Color number meaning "the default color".
pub const DEFAULT_COLOR_CODE: u8 = 99;

/// Maximum number of digits in either color slot.
const MAX_COLOR_DIGITS: u8 = 2;

/// Classification of one position in a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// A run of displayable bytes of the given length.
    Plain(usize),
    /// The color marker byte.
    ColorStart,
    /// One digit of a color number.
    ColorDigit {
        /// Digit value, 0-9.
        digit: u8,
        /// Whether the digit belongs to the background slot.
        background: bool,
    },
    /// The `,` separating foreground from background digits.
    ColorComma,
    /// Bold toggle.
    Bold,
    /// Underline toggle.
    Underline,
    /// Reverse video toggle.
    Reverse,
    /// Reset to default attributes.
    Reset,
    /// Bell byte, skipped.
    Beep,
}

impl Token {
    /// Number of bytes the token covers.
    pub fn len(&self) -> usize {
        match self {
            Token::Plain(n) => *n,
            _ => 1,
        }
    }

    /// Tokens always cover at least one byte.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// True for displayable text.
    pub fn is_plain(&self) -> bool {
        matches!(self, Token::Plain(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ColorPhase {
    #[default]
    Idle,
    Foreground(u8),
    Background(u8),
}

/// Position classifier.
///
/// The only state carried between calls is whether a color code is still
/// consuming digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttrScanner {
    phase: ColorPhase,
}

impl AttrScanner {
    /// Scanner positioned outside any color code.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify the byte at `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos >= bytes.len()`.
    pub fn classify(&mut self, bytes: &[u8], pos: usize) -> Token {
        let b = bytes[pos];

        match self.phase {
            ColorPhase::Foreground(n) if b.is_ascii_digit() && n < MAX_COLOR_DIGITS => {
                self.phase = ColorPhase::Foreground(n + 1);
                return Token::ColorDigit {
                    digit: b - b'0',
                    background: false,
                };
            }
            ColorPhase::Foreground(_)
                if b == b',' && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit) =>
            {
                self.phase = ColorPhase::Background(0);
                return Token::ColorComma;
            }
            ColorPhase::Background(n) if b.is_ascii_digit() && n < MAX_COLOR_DIGITS => {
                self.phase = ColorPhase::Background(n + 1);
                return Token::ColorDigit {
                    digit: b - b'0',
                    background: true,
                };
            }
            _ => {}
        }

        self.phase = ColorPhase::Idle;
        match b {
            ATTR_COLOR => {
                self.phase = ColorPhase::Foreground(0);
                Token::ColorStart
            }
            ATTR_BOLD => Token::Bold,
            ATTR_UNDERLINE => Token::Underline,
            ATTR_REVERSE => Token::Reverse,
            ATTR_RESET => Token::Reset,
            ATTR_BEEP => Token::Beep,
            _ => Token::Plain(plain_run_len(bytes, pos)),
        }
    }
}

/// True for bytes that start an attribute code.
pub fn is_attr_byte(b: u8) -> bool {
    matches!(
        b,
        ATTR_BOLD | ATTR_COLOR | ATTR_BEEP | ATTR_RESET | ATTR_REVERSE | ATTR_UNDERLINE
    )
}

/// Word-wrap and word-selection delimiters.
///
/// Reset and bold only split words for selection: the wrap walk consumes
/// them as attribute codes first.
pub fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b' ' | b'\n' | b')' | b'(' | b'>' | b'<' | ATTR_RESET | ATTR_BOLD | 0
    )
}

fn plain_run_len(bytes: &[u8], pos: usize) -> usize {
    bytes[pos..]
        .iter()
        .position(|&b| is_attr_byte(b))
        .unwrap_or(bytes.len() - pos)
        .max(1)
}

/// Iterator over `(offset, token)` pairs of a line.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    bytes: &'a [u8],
    pos: usize,
    end: usize,
    scanner: AttrScanner,
}

impl<'a> Tokens<'a> {
    /// Tokenize `bytes[start..end]` with an existing scanner state.
    ///
    /// Plain runs are cut at `end` so callers can walk a single sub-line.
    pub fn resume(bytes: &'a [u8], start: usize, end: usize, scanner: AttrScanner) -> Self {
        let end = end.min(bytes.len());
        Self {
            bytes,
            pos: start.min(end),
            end,
            scanner,
        }
    }

    /// Scanner state after the last yielded token.
    pub fn scanner(&self) -> AttrScanner {
        self.scanner
    }

    /// Offset of the next token.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl Iterator for Tokens<'_> {
    type Item = (usize, Token);

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.end {
            return None;
        }
        let at = self.pos;
        let token = match self.scanner.classify(self.bytes, at) {
            Token::Plain(n) => Token::Plain(n.min(self.end - at)),
            other => other,
        };
        self.pos += token.len();
        Some((at, token))
    }
}

/// Tokenize a whole line.
pub fn tokens(bytes: &[u8]) -> Tokens<'_> {
    Tokens::resume(bytes, 0, bytes.len(), AttrScanner::new())
}

/// Resolved display attributes of a run of text.
///
/// Colors are palette indices 0-15; `None` is the default color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStyle {
    /// Foreground palette index.
    pub fg: Option<u8>,
    /// Background palette index.
    pub bg: Option<u8>,
    /// Bold.
    pub bold: bool,
    /// Underline.
    pub underline: bool,
    /// Reverse video.
    pub reverse: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct PendingColor {
    fg: Option<u8>,
    bg: Option<u8>,
}

/// Running attribute state of a line being measured or painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttrState {
    style: TextStyle,
    pending: Option<PendingColor>,
}

impl AttrState {
    /// Default attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attributes in effect for the next plain run.
    pub fn style(&self) -> TextStyle {
        self.style
    }

    /// Fold one token into the state.
    pub fn apply(&mut self, token: Token) {
        match token {
            Token::ColorDigit { digit, background } => {
                if let Some(pending) = self.pending.as_mut() {
                    let slot = if background {
                        &mut pending.bg
                    } else {
                        &mut pending.fg
                    };
                    *slot = Some(slot.unwrap_or(0) * 10 + digit);
                }
                return;
            }
            Token::ColorComma => return,
            _ => self.finish(),
        }

        match token {
            Token::ColorStart => self.pending = Some(PendingColor::default()),
            Token::Bold => self.style.bold = !self.style.bold,
            Token::Underline => self.style.underline = !self.style.underline,
            Token::Reverse => self.style.reverse = !self.style.reverse,
            Token::Reset => self.style = TextStyle::default(),
            _ => {}
        }
    }

    /// Close a color code that ended without a following token.
    pub fn finish(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        if pending.fg.is_none() && pending.bg.is_none() {
            // a bare marker resets both colors
            self.style.fg = None;
            self.style.bg = None;
            return;
        }
        if let Some(code) = pending.fg {
            self.style.fg = palette_index(code);
        }
        if let Some(code) = pending.bg {
            self.style.bg = palette_index(code);
        }
    }
}

/// Map a color number to a palette index. `99` is the default color.
pub fn palette_index(code: u8) -> Option<u8> {
    if code == DEFAULT_COLOR_CODE {
        None
    } else {
        Some(code % 16)
    }
}

/// Remove every attribute code, keeping displayable bytes.
pub fn strip_attributes(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    for (at, token) in tokens(bytes) {
        if let Token::Plain(n) = token {
            out.extend_from_slice(&bytes[at..at + n]);
        }
    }
    out
}

/// Rewrite attribute codes into a literal `%X` form for pasting.
///
/// Color digits are kept after `%C`; the bell is dropped.
pub fn convert_attributes(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + bytes.len() / 4);
    for (at, token) in tokens(bytes) {
        match token {
            Token::Plain(n) => out.extend_from_slice(&bytes[at..at + n]),
            Token::ColorDigit { .. } | Token::ColorComma => out.push(bytes[at]),
            Token::ColorStart => out.extend_from_slice(b"%C"),
            Token::Bold => out.extend_from_slice(b"%B"),
            Token::Underline => out.extend_from_slice(b"%U"),
            Token::Reverse => out.extend_from_slice(b"%R"),
            Token::Reset => out.extend_from_slice(b"%O"),
            Token::Beep => {}
        }
    }
    out
}

/// True when any byte is outside ASCII.
pub fn is_multibyte(bytes: &[u8]) -> bool {
    bytes.iter().any(|&b| b >= 0x80)
}
