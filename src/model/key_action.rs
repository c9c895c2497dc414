//! Domain-level keyboard actions independent of key bindings.

/// Actions the viewer can perform in response to a key.
///
/// These represent user intent, not specific keys. The mapping from
/// `crossterm::event::KeyEvent` to `KeyAction` is handled by `KeyBindings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    // Scrolling
    /// Scroll up by one visual line. Default: k/↑
    ScrollUp,
    /// Scroll down by one visual line. Default: j/↓
    ScrollDown,
    /// Scroll up by one page. Default: Ctrl+u/Page Up
    PageUp,
    /// Scroll down by one page. Default: Ctrl+d/Page Down
    PageDown,
    /// Jump to the oldest line. Default: g/Home
    ScrollToTop,
    /// Jump to the newest line and follow new input. Default: G/End
    ScrollToBottom,

    // Search
    /// Open the search prompt. Default: /
    StartSearch,
    /// Find the next occurrence of the last pattern. Default: n
    NextMatch,

    // Selection
    /// Print the current selection to the log and clear it. Default: y
    CopySelection,
    /// Drop the current selection. Default: Esc
    ClearSelection,

    // Layout
    /// Toggle word-wrap. Default: w
    ToggleWordwrap,
    /// Toggle time stamps. Default: t
    ToggleTimestamps,

    /// Exit the viewer. Default: q/Ctrl+c
    Quit,
}
