//! Terminal front end.
//!
//! Owns the terminal and one [`Scrollback`]. Lines from the input source are
//! batched and flushed once per refresh tick; keys and mouse events act on
//! the scrollback directly.

pub mod sink;
pub mod styles;

pub use sink::BufferSink;
pub use styles::{run_style, ColorConfig, MIRC_PALETTE};

use crate::config::keybindings::KeyBindings;
use crate::integration;
use crate::model::{InputError, KeyAction};
use crate::source::InputSource;
use crate::view_state::measure::utf8_char_len;
use crate::view_state::{CellMeasurer, Scrollback, ScrollbackOptions, TextPosition};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Layout},
    widgets::{Paragraph, Widget},
    Terminal,
};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Two clicks closer together than this select a word.
const DOUBLE_CLICK: Duration = Duration::from_millis(400);

/// Visual lines moved per mouse wheel notch.
const WHEEL_LINES: isize = 3;

/// Errors that can occur during TUI operations
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error during terminal operations
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),

    /// Input source error
    #[error("Input error: {0}")]
    Input(#[from] InputError),
}

/// Settings the viewer starts with.
#[derive(Debug, Clone)]
pub struct ViewArgs {
    /// Scrollback settings.
    pub options: ScrollbackOptions,
    /// How often pending lines are flushed and the screen redrawn.
    pub refresh: Duration,
    /// Whether palette colors are drawn.
    pub colors: ColorConfig,
    /// Pattern to search for once the first lines are in.
    pub search: Option<String>,
}

impl Default for ViewArgs {
    fn default() -> Self {
        Self {
            options: ScrollbackOptions::default(),
            refresh: Duration::from_millis(crate::config::loader::DEFAULT_REFRESH_MS),
            colors: ColorConfig::default(),
            search: None,
        }
    }
}

/// Main TUI application
///
/// Generic over backend to support testing with TestBackend
pub struct TuiApp<B>
where
    B: Backend,
{
    terminal: Terminal<B>,
    scrollback: Scrollback<CellMeasurer>,
    input_source: InputSource,
    key_bindings: KeyBindings,
    /// Lines read but not yet appended
    pending: Vec<Vec<u8>>,
    last_flush: Instant,
    refresh: Duration,
    colors: ColorConfig,
    /// Search prompt contents while typing
    prompt: Option<String>,
    last_pattern: Option<String>,
    status: Option<String>,
    drag_anchor: Option<TextPosition>,
    last_click: Option<(Instant, u16, u16)>,
}

impl TuiApp<CrosstermBackend<Stdout>> {
    /// Create and initialize a new TUI application
    ///
    /// Sets up terminal in raw mode with alternate screen and mouse capture.
    pub fn new(input_source: InputSource, args: ViewArgs) -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(event::EnableMouseCapture)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Self::with_terminal(terminal, input_source, args)
    }

    /// Run the main event loop
    ///
    /// Returns when the user quits (q or Ctrl+C). Waits at most one refresh
    /// interval for an event, then flushes whatever input arrived.
    pub fn run(&mut self) -> Result<(), TuiError> {
        self.draw()?;

        loop {
            let mut dirty = false;
            if event::poll(self.refresh)? {
                match event::read()? {
                    Event::Key(key) => {
                        if self.handle_key(key) {
                            return Ok(());
                        }
                        dirty = true;
                    }
                    Event::Mouse(mouse) => {
                        self.handle_mouse(mouse);
                        dirty = true;
                    }
                    Event::Resize(width, height) => {
                        self.handle_resize(width, height);
                        dirty = true;
                    }
                    _ => {}
                }
            }

            self.poll_input()?;
            if self.last_flush.elapsed() >= self.refresh {
                dirty |= self.flush_pending();
            }
            if dirty {
                self.draw()?;
            }
        }
    }
}

impl<B> TuiApp<B>
where
    B: Backend,
{
    /// Build the app on an already set-up terminal and load the first lines.
    pub fn with_terminal(
        terminal: Terminal<B>,
        input_source: InputSource,
        args: ViewArgs,
    ) -> Result<Self, TuiError> {
        let size = terminal.size()?;
        let mut scrollback =
            Scrollback::new(CellMeasurer::new(), u32::from(size.width), args.options);
        scrollback.set_page_rows(page_rows(size.height));

        let mut app = Self {
            terminal,
            scrollback,
            input_source,
            key_bindings: KeyBindings::default(),
            pending: Vec::new(),
            last_flush: Instant::now(),
            refresh: args.refresh,
            colors: args.colors,
            prompt: None,
            last_pattern: None,
            status: None,
            drag_anchor: None,
            last_click: None,
        };

        app.poll_input()?;
        app.flush_pending();

        if let Some(pattern) = args.search.filter(|p| !p.is_empty()) {
            app.search(pattern);
        }
        Ok(app)
    }

    /// The scrollback being shown.
    pub fn scrollback(&self) -> &Scrollback<CellMeasurer> {
        &self.scrollback
    }

    /// Status line text as last drawn.
    pub fn status_text(&self) -> String {
        if let Some(query) = &self.prompt {
            return format!("/{}", query);
        }
        if let Some(message) = &self.status {
            return message.clone();
        }
        let total = self.scrollback.total_visual_lines();
        let top = self.scrollback.scroll();
        let bottom = (top + self.scrollback.page_rows()).min(total);
        let mut text = if total == 0 {
            "empty".to_string()
        } else {
            format!("lines {}-{} of {}", top + 1, bottom, total)
        };
        if self.input_source.is_live() {
            text.push_str(" [LIVE]");
        }
        if !self.scrollback.wordwrap() {
            text.push_str(" [nowrap]");
        }
        text
    }

    /// Read whatever the source has ready into the pending batch.
    fn poll_input(&mut self) -> Result<(), TuiError> {
        let lines = self.input_source.poll()?;
        if !lines.is_empty() {
            debug!(count = lines.len(), "queued input lines");
            self.pending.extend(lines);
        }
        Ok(())
    }

    /// Append the pending batch. Returns true when anything was added.
    fn flush_pending(&mut self) -> bool {
        self.last_flush = Instant::now();
        if self.pending.is_empty() {
            return false;
        }
        let lines = std::mem::take(&mut self.pending);
        integration::feed_lines(&mut self.scrollback, lines);
        true
    }

    /// Handle a single keyboard event
    ///
    /// Returns true if app should quit
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if let Some(query) = self.prompt.as_mut() {
            match key.code {
                KeyCode::Esc => self.prompt = None,
                KeyCode::Enter => {
                    let query = std::mem::take(query);
                    self.prompt = None;
                    if !query.is_empty() {
                        self.search(query);
                    }
                }
                KeyCode::Backspace => {
                    query.pop();
                }
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    query.push(c);
                }
                _ => {}
            }
            return false;
        }

        let Some(action) = self.key_bindings.get(key) else {
            return false;
        };
        self.status = None;
        let page = self.scrollback.page_rows().max(1) as isize;

        match action {
            KeyAction::Quit => return true,
            KeyAction::ScrollUp => self.scrollback.scroll_by(-1),
            KeyAction::ScrollDown => self.scrollback.scroll_by(1),
            KeyAction::PageUp => self.scrollback.scroll_by(-page),
            KeyAction::PageDown => self.scrollback.scroll_by(page),
            KeyAction::ScrollToTop => self.scrollback.scroll_to(0),
            KeyAction::ScrollToBottom => self.scrollback.scroll_to_bottom(),
            KeyAction::StartSearch => self.prompt = Some(String::new()),
            KeyAction::NextMatch => {
                if let Some(pattern) = self.last_pattern.clone() {
                    self.search(pattern);
                }
            }
            KeyAction::CopySelection => match self.scrollback.selection_text() {
                Some(text) => {
                    info!(chars = text.chars().count(), "copied selection");
                    self.status = Some(format!("copied: {}", text.replace('\n', " ")));
                    self.scrollback.clear_selection();
                }
                None => self.status = Some("nothing selected".to_string()),
            },
            KeyAction::ClearSelection => {
                self.scrollback.clear_selection();
            }
            KeyAction::ToggleWordwrap => {
                let wordwrap = !self.scrollback.wordwrap();
                self.scrollback.set_wordwrap(wordwrap);
            }
            KeyAction::ToggleTimestamps => {
                let time_stamp = !self.scrollback.time_stamp();
                self.scrollback.set_time_stamp(time_stamp);
            }
        }
        false
    }

    fn search(&mut self, pattern: String) {
        if self.scrollback.find_next(pattern.as_bytes()).is_none() {
            warn!(pattern = %pattern, "search found nothing");
            self.status = Some(format!("Pattern not found: {}", pattern));
        } else {
            self.status = None;
        }
        self.last_pattern = Some(pattern);
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let (column, row) = (mouse.column, mouse.row);
        let on_page = usize::from(row) < self.scrollback.page_rows();
        let x = u32::from(column) * self.scrollback.measurer().cell_width();

        match mouse.kind {
            MouseEventKind::ScrollUp => self.scrollback.scroll_by(-WHEEL_LINES),
            MouseEventKind::ScrollDown => self.scrollback.scroll_by(WHEEL_LINES),
            MouseEventKind::Down(MouseButton::Left) if on_page => {
                let now = Instant::now();
                let double = self.last_click.is_some_and(|(at, c, r)| {
                    now.duration_since(at) < DOUBLE_CLICK && c == column && r == row
                });
                self.scrollback.clear_selection();
                if double {
                    self.last_click = None;
                    self.drag_anchor = None;
                    if let Some(word) = self.scrollback.word_at(x, usize::from(row)) {
                        self.scrollback.set_selection(
                            TextPosition::new(word.entry, word.bytes.start),
                            TextPosition::new(word.entry, word.bytes.end),
                        );
                    }
                } else {
                    self.last_click = Some((now, column, row));
                    self.drag_anchor = self
                        .scrollback
                        .hit_test(x, usize::from(row))
                        .map(|hit| TextPosition::new(hit.entry, hit.offset));
                }
            }
            MouseEventKind::Drag(MouseButton::Left) if on_page => {
                let Some(mut anchor) = self.drag_anchor else {
                    return;
                };
                let Some(hit) = self.scrollback.hit_test(x, usize::from(row)) else {
                    return;
                };
                let mut active = TextPosition::new(hit.entry, hit.offset);
                // both end characters are selected, whichever way the drag goes
                if active >= anchor {
                    if !hit.out_of_bounds {
                        active.offset += self.char_len_at(active);
                    }
                } else {
                    anchor.offset += self.char_len_at(anchor);
                }
                self.scrollback.set_selection(anchor, active);
            }
            MouseEventKind::Up(MouseButton::Left) => self.drag_anchor = None,
            _ => {}
        }
    }

    fn char_len_at(&self, pos: TextPosition) -> usize {
        self.scrollback
            .store()
            .get(pos.entry)
            .and_then(|line| line.bytes().get(pos.offset).copied())
            .map_or(0, utf8_char_len)
    }

    fn handle_resize(&mut self, width: u16, height: u16) {
        debug!(width, height, "terminal resized");
        self.scrollback.resize(u32::from(width));
        self.scrollback.set_page_rows(page_rows(height));
    }

    /// Render the current frame
    fn draw(&mut self) -> Result<(), TuiError> {
        let status = self.status_text();
        let colors = self.colors;
        let scrollback = &mut self.scrollback;

        self.terminal.draw(|frame| {
            let [page, status_area] =
                Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(frame.area());
            let mut sink = BufferSink::new(frame.buffer_mut(), page, CellMeasurer::new(), colors);
            scrollback.render_page(&mut sink);
            Paragraph::new(status)
                .style(styles::status_style(colors))
                .render(status_area, frame.buffer_mut());
        })?;
        Ok(())
    }
}

/// Page rows for a terminal `height` rows tall; the last row is the status line.
fn page_rows(height: u16) -> usize {
    usize::from(height.saturating_sub(1))
}

/// Initialize and run the TUI application with input source and args
///
/// Handles terminal setup, runs the event loop, and restores the terminal on
/// exit. Logging must be initialized by the caller.
pub fn run_with_source(input_source: InputSource, args: ViewArgs) -> Result<(), TuiError> {
    let result = TuiApp::new(input_source, args).and_then(|mut app| app.run());

    // Always restore terminal state
    restore_terminal()?;

    result
}

/// Restore terminal to normal state
///
/// Disables raw mode, mouse capture, and leaves alternate screen
fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(event::DisableMouseCapture)?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
