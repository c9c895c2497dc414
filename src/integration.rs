//! Pure glue between line sources and the scrollback.
//!
//! The event loop polls a source, hands the raw lines to [`feed_lines`] and
//! redraws. Nothing here touches the terminal, so it is testable without I/O.

use std::thread;
use std::time::Duration;

use tracing::{debug, trace};

use crate::model::{EntryId, InputError};
use crate::source::InputSource;
use crate::view_state::{Scrollback, WidthMeasurer};

/// Pause between polls while waiting for a live source to finish.
const DRAIN_POLL: Duration = Duration::from_millis(10);

/// How a raw input line is appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineShape<'a> {
    /// No tab: one column starting at the plain indent.
    Plain(&'a [u8]),
    /// `left\tright`: nick column and message column.
    TwoColumn {
        /// Text right-aligned against the separator.
        left: &'a [u8],
        /// Text starting at the separator.
        right: &'a [u8],
    },
}

/// Classify a raw line by its first tab.
///
/// A leading tab still makes a two-column line with an empty left side.
pub fn line_shape(line: &[u8]) -> LineShape<'_> {
    match line.iter().position(|&b| b == b'\t') {
        Some(tab) => LineShape::TwoColumn {
            left: &line[..tab],
            right: &line[tab + 1..],
        },
        None => LineShape::Plain(line),
    }
}

/// Append one raw line.
pub fn feed_line<M: WidthMeasurer>(scrollback: &mut Scrollback<M>, line: &[u8]) -> EntryId {
    match line_shape(line) {
        LineShape::Plain(text) => scrollback.append(text),
        LineShape::TwoColumn { left, right } => scrollback.append_indent(left, right),
    }
}

/// Append a batch of raw lines, returning how many were added.
pub fn feed_lines<M, I>(scrollback: &mut Scrollback<M>, lines: I) -> usize
where
    M: WidthMeasurer,
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    let mut added = 0;
    for line in lines {
        feed_line(scrollback, line.as_ref());
        added += 1;
    }
    if added > 0 {
        trace!(added, total = scrollback.len(), "fed lines into scrollback");
    }
    added
}

/// Feed every line the source will ever produce, blocking until it ends.
///
/// Used for non-interactive runs such as exports.
///
/// # Errors
///
/// Returns the first `InputError` the source reports.
pub fn load_all<M: WidthMeasurer>(
    source: &mut InputSource,
    scrollback: &mut Scrollback<M>,
) -> Result<usize, InputError> {
    let mut added = feed_lines(scrollback, source.poll()?);
    while source.is_live() {
        thread::sleep(DRAIN_POLL);
        added += feed_lines(scrollback, source.poll()?);
    }
    debug!(added, "input source drained");
    Ok(added)
}
