//! Mapping attribute styles to terminal styles.
//!
//! Colors 0-15 follow the mIRC palette. Terminals differ in what their named
//! colors look like, so the palette uses RGB values.

use crate::model::attr::TextStyle;
use ratatui::style::{Color, Modifier, Style};

/// The sixteen mIRC colors, index = color code.
pub const MIRC_PALETTE: [Color; 16] = [
    Color::Rgb(0xff, 0xff, 0xff), // 0 white
    Color::Rgb(0x00, 0x00, 0x00), // 1 black
    Color::Rgb(0x00, 0x00, 0x7f), // 2 blue
    Color::Rgb(0x00, 0x93, 0x00), // 3 green
    Color::Rgb(0xff, 0x00, 0x00), // 4 light red
    Color::Rgb(0x7f, 0x00, 0x00), // 5 brown
    Color::Rgb(0x9c, 0x00, 0x9c), // 6 purple
    Color::Rgb(0xfc, 0x7f, 0x00), // 7 orange
    Color::Rgb(0xff, 0xff, 0x00), // 8 yellow
    Color::Rgb(0x00, 0xfc, 0x00), // 9 light green
    Color::Rgb(0x00, 0x93, 0x93), // 10 cyan
    Color::Rgb(0x00, 0xff, 0xff), // 11 light cyan
    Color::Rgb(0x00, 0x00, 0xfc), // 12 light blue
    Color::Rgb(0xff, 0x00, 0xff), // 13 pink
    Color::Rgb(0x7f, 0x7f, 0x7f), // 14 grey
    Color::Rgb(0xd2, 0xd2, 0xd2), // 15 light grey
];

// ===== ColorConfig =====

/// Configuration for color output.
///
/// Determines whether colors should be enabled or disabled based on:
/// - `--no-color` CLI flag
/// - `NO_COLOR` environment variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorConfig {
    enabled: bool,
}

impl ColorConfig {
    /// Create a ColorConfig from CLI args and environment.
    ///
    /// Priority (first match wins):
    /// 1. `--no-color` flag (disables colors)
    /// 2. `NO_COLOR` env var (any value disables colors)
    /// 3. Default: colors enabled
    pub fn from_env_and_args(no_color_flag: bool) -> Self {
        let enabled = !no_color_flag && std::env::var_os("NO_COLOR").is_none();
        Self { enabled }
    }

    /// Colors on or off regardless of the environment.
    pub fn with_colors(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Check if colors are enabled.
    pub fn colors_enabled(self) -> bool {
        self.enabled
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self::with_colors(true)
    }
}

/// Terminal color for palette index `index`.
pub fn palette_color(index: u8) -> Color {
    MIRC_PALETTE[usize::from(index % 16)]
}

/// Terminal style for a run of text.
///
/// Bold, underline and reverse survive `NO_COLOR`; palette colors don't.
/// Selected runs are drawn reversed.
pub fn run_style(style: &TextStyle, selected: bool, colors: ColorConfig) -> Style {
    let mut out = Style::default();
    if colors.colors_enabled() {
        if let Some(fg) = style.fg {
            out = out.fg(palette_color(fg));
        }
        if let Some(bg) = style.bg {
            out = out.bg(palette_color(bg));
        }
    }
    if style.bold {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.underline {
        out = out.add_modifier(Modifier::UNDERLINED);
    }
    // selecting reversed text flips it back
    if style.reverse != selected {
        out = out.add_modifier(Modifier::REVERSED);
    }
    out
}

/// Style of the status line.
pub fn status_style(colors: ColorConfig) -> Style {
    if colors.colors_enabled() {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    } else {
        Style::default().add_modifier(Modifier::REVERSED)
    }
}

// ===== Tests =====
