//! Shared fixtures for unit tests.
//!
//! [`RecordingSink`] captures what the renderer paints so tests can assert
//! on rows and runs without a terminal. [`buffer_to_string`] flattens a
//! ratatui buffer for front-end tests.

use crate::model::attr::TextStyle;
use crate::view_state::{CellMeasurer, PaintSink, WidthMeasurer};

/// One `draw_run` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRun {
    pub x: u32,
    pub row: usize,
    pub text: String,
    pub selected: bool,
    pub style: TextStyle,
}

/// Paint sink that remembers every call.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub runs: Vec<RecordedRun>,
    pub cleared: Vec<usize>,
    measurer: CellMeasurer,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text painted on `row`, runs joined left to right.
    pub fn row_text(&self, row: usize) -> String {
        let mut runs: Vec<&RecordedRun> = self.runs.iter().filter(|r| r.row == row).collect();
        runs.sort_by_key(|r| r.x);
        runs.iter().map(|r| r.text.as_str()).collect()
    }
}

impl PaintSink for RecordingSink {
    fn draw_run(&mut self, x: u32, row: usize, text: &[u8], selected: bool, style: &TextStyle) -> u32 {
        self.runs.push(RecordedRun {
            x,
            row,
            text: String::from_utf8_lossy(text).into_owned(),
            selected,
            style: *style,
        });
        self.measurer.measure(text, true)
    }

    fn clear_row(&mut self, row: usize) {
        self.cleared.push(row);
    }
}

/// Render a ratatui buffer as text, one line per row, trailing blanks trimmed.
pub fn buffer_to_string(buffer: &ratatui::buffer::Buffer) -> String {
    let area = buffer.area();
    let mut lines = Vec::new();

    for y in area.top()..area.bottom() {
        let mut line = String::new();
        for x in area.left()..area.right() {
            line.push_str(buffer[(x, y)].symbol());
        }
        lines.push(line.trim_end().to_string());
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}
