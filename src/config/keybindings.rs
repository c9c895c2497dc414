//! Keyboard bindings configuration.

use crate::model::key_action::KeyAction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Maps keyboard events to domain actions.
///
/// Provides default vim-style bindings alongside arrow and page keys.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<KeyEvent, KeyAction>,
}

impl KeyBindings {
    /// Look up the action for a key event.
    pub fn get(&self, key: KeyEvent) -> Option<KeyAction> {
        self.bindings.get(&key).copied()
    }

    /// Bind `key` to `action`, replacing any previous binding.
    pub fn bind(&mut self, key: KeyEvent, action: KeyAction) {
        self.bindings.insert(key, action);
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let plain = |c: char| KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
        let shifted = |c: char| KeyEvent::new(KeyCode::Char(c), KeyModifiers::SHIFT);
        let ctrl = |c: char| KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL);
        let key = |code: KeyCode| KeyEvent::new(code, KeyModifiers::NONE);

        let table = [
            // Vim-style scrolling
            (plain('j'), KeyAction::ScrollDown),
            (plain('k'), KeyAction::ScrollUp),
            (plain('g'), KeyAction::ScrollToTop),
            (shifted('G'), KeyAction::ScrollToBottom),
            (ctrl('d'), KeyAction::PageDown),
            (ctrl('u'), KeyAction::PageUp),
            // Arrow and page keys
            (key(KeyCode::Down), KeyAction::ScrollDown),
            (key(KeyCode::Up), KeyAction::ScrollUp),
            (key(KeyCode::PageDown), KeyAction::PageDown),
            (key(KeyCode::PageUp), KeyAction::PageUp),
            (key(KeyCode::Home), KeyAction::ScrollToTop),
            (key(KeyCode::End), KeyAction::ScrollToBottom),
            // Search
            (plain('/'), KeyAction::StartSearch),
            (plain('n'), KeyAction::NextMatch),
            // Selection
            (plain('y'), KeyAction::CopySelection),
            (key(KeyCode::Esc), KeyAction::ClearSelection),
            // Layout toggles
            (plain('w'), KeyAction::ToggleWordwrap),
            (plain('t'), KeyAction::ToggleTimestamps),
            // Application controls
            (plain('q'), KeyAction::Quit),
            (ctrl('c'), KeyAction::Quit),
        ];

        Self {
            bindings: table.into_iter().collect(),
        }
    }
}
