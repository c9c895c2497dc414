//! Paint sink writing into a ratatui buffer.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use super::styles::{run_style, ColorConfig};
use crate::model::attr::TextStyle;
use crate::view_state::{CellMeasurer, PaintSink, WidthMeasurer};

/// Paints renderer runs into `area` of a frame buffer.
///
/// Row 0 is the top of `area`; x is in measurer units, so it is divided by
/// the cell width to get a column. Anything outside `area` is measured but
/// not drawn.
pub struct BufferSink<'a> {
    buf: &'a mut Buffer,
    area: Rect,
    measurer: CellMeasurer,
    colors: ColorConfig,
}

impl<'a> BufferSink<'a> {
    /// Sink over `area` of `buf`.
    pub fn new(buf: &'a mut Buffer, area: Rect, measurer: CellMeasurer, colors: ColorConfig) -> Self {
        Self {
            buf,
            area,
            measurer,
            colors,
        }
    }
}

impl PaintSink for BufferSink<'_> {
    fn draw_run(&mut self, x: u32, row: usize, text: &[u8], selected: bool, style: &TextStyle) -> u32 {
        let width = self.measurer.measure(text, true);
        let Ok(row) = u16::try_from(row) else {
            return width;
        };
        if row >= self.area.height {
            return width;
        }

        let style = run_style(style, selected, self.colors);
        let cell = self.measurer.cell_width();
        let right = self.area.right();
        let y = self.area.y + row;
        let mut col = u32::from(self.area.x) + x / cell;
        let mut pos = 0;
        while pos < text.len() {
            let (w, len) = self.measurer.char_width(&text[pos..]);
            let columns = w / cell;
            if columns > 0 {
                let Ok(c) = u16::try_from(col) else {
                    break;
                };
                if c >= right || c + columns as u16 > right {
                    break;
                }
                let symbol = display_symbol(&text[pos..pos + len]);
                if let Some(target) = self.buf.cell_mut((c, y)) {
                    target.set_symbol(&symbol).set_style(style);
                }
                // wide characters own the cells they cover
                for extra in 1..columns as u16 {
                    if let Some(target) = self.buf.cell_mut((c + extra, y)) {
                        target.set_symbol("").set_style(style);
                    }
                }
                col += columns;
            }
            pos += len;
        }
        width
    }

    fn clear_row(&mut self, row: usize) {
        let Ok(row) = u16::try_from(row) else {
            return;
        };
        if row >= self.area.height {
            return;
        }
        let y = self.area.y + row;
        for x in self.area.left()..self.area.right() {
            if let Some(cell) = self.buf.cell_mut((x, y)) {
                cell.reset();
            }
        }
    }
}

/// One character as a cell symbol; invalid bytes become U+FFFD.
fn display_symbol(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => char::REPLACEMENT_CHARACTER.to_string(),
    }
}
