//! Settings of a scrollback that do not change per entry.

use crate::config::ResolvedConfig;

use super::reflow::{DEFAULT_WRAP_LIMIT, MARGIN};

/// Upper bound for the separator column when auto-indent moves it.
pub const DEFAULT_MAX_AUTO_INDENT: u32 = 30;

/// Settings a [`Scrollback`](super::Scrollback) is created with.
///
/// Two values are equal if they would lay out and render a store the same
/// way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollbackOptions {
    /// Capacity in visual lines; 0 is unbounded.
    pub capacity: usize,
    /// Break long lines at delimiters.
    pub wordwrap: bool,
    /// How far word-wrap may reach back for a delimiter, in bytes.
    pub wrap_limit: usize,
    /// Separator column for two-column entries.
    pub indent: u32,
    /// Move the separator right when a left column does not fit.
    pub auto_indent: bool,
    /// Auto-indent never moves the separator past this column.
    pub max_auto_indent: u32,
    /// Draw `[HH:MM:SS]` in front of every entry.
    pub time_stamp: bool,
    /// Copy selections with `%C`-style codes instead of plain text.
    pub color_paste: bool,
}

impl Default for ScrollbackOptions {
    fn default() -> Self {
        Self {
            capacity: 0,
            wordwrap: true,
            wrap_limit: DEFAULT_WRAP_LIMIT,
            indent: MARGIN,
            auto_indent: true,
            max_auto_indent: DEFAULT_MAX_AUTO_INDENT,
            time_stamp: false,
            color_paste: false,
        }
    }
}

impl From<&ResolvedConfig> for ScrollbackOptions {
    fn from(config: &ResolvedConfig) -> Self {
        Self {
            capacity: config.capacity,
            wordwrap: config.wordwrap,
            wrap_limit: config.wrap_limit,
            indent: config.indent,
            auto_indent: config.auto_indent,
            max_auto_indent: config.max_auto_indent,
            time_stamp: config.time_stamp,
            color_paste: config.color_paste,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_resolved_config_defaults() {
        let from_config = ScrollbackOptions::from(&ResolvedConfig::default());
        let defaults = ScrollbackOptions::default();
        assert_eq!(from_config.wordwrap, defaults.wordwrap);
        assert_eq!(from_config.wrap_limit, defaults.wrap_limit);
        assert_eq!(from_config.auto_indent, defaults.auto_indent);
        assert_eq!(from_config.max_auto_indent, defaults.max_auto_indent);
    }

    #[test]
    fn test_config_values_carry_over() {
        let config = ResolvedConfig {
            capacity: 500,
            wordwrap: false,
            time_stamp: true,
            color_paste: true,
            ..ResolvedConfig::default()
        };
        let options = ScrollbackOptions::from(&config);
        assert_eq!(options.capacity, 500);
        assert!(!options.wordwrap);
        assert!(options.time_stamp);
        assert!(options.color_paste);
    }
}
