//! Configuration file loading with precedence handling.

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

use crate::view_state::options::DEFAULT_MAX_AUTO_INDENT;
use crate::view_state::reflow::{DEFAULT_WRAP_LIMIT, MARGIN};

/// Default scrollback capacity, in visual lines.
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Default debounce between redraws while input is arriving.
pub const DEFAULT_REFRESH_MS: u64 = 40;

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file path contains invalid UTF-8 or cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/chatscroll/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Scrollback capacity in visual lines (0 = unbounded).
    #[serde(default)]
    pub capacity: Option<usize>,

    /// Break long lines at word boundaries.
    #[serde(default)]
    pub wordwrap: Option<bool>,

    /// How far back word-wrap may look for a delimiter, in bytes.
    #[serde(default)]
    pub wrap_limit: Option<usize>,

    /// Separator column for two-column lines.
    #[serde(default)]
    pub indent: Option<u32>,

    /// Move the separator when a left column does not fit.
    #[serde(default)]
    pub auto_indent: Option<bool>,

    /// Rightmost separator column auto-indent may choose.
    #[serde(default)]
    pub max_auto_indent: Option<u32>,

    /// Show `[HH:MM:SS]` time stamps.
    #[serde(default)]
    pub time_stamp: Option<bool>,

    /// Copy selections with `%C`-style attribute escapes.
    #[serde(default)]
    pub color_paste: Option<bool>,

    /// Redraw debounce in milliseconds.
    #[serde(default)]
    pub refresh_ms: Option<u64>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Scrollback capacity in visual lines.
    pub capacity: usize,
    /// Word-wrap.
    pub wordwrap: bool,
    /// Word-wrap reach in bytes.
    pub wrap_limit: usize,
    /// Separator column.
    pub indent: u32,
    /// Auto-indent.
    pub auto_indent: bool,
    /// Auto-indent limit.
    pub max_auto_indent: u32,
    /// Time stamps.
    pub time_stamp: bool,
    /// Color paste.
    pub color_paste: bool,
    /// Redraw debounce in milliseconds.
    pub refresh_ms: u64,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            wordwrap: true,
            wrap_limit: DEFAULT_WRAP_LIMIT,
            indent: MARGIN,
            auto_indent: true,
            max_auto_indent: DEFAULT_MAX_AUTO_INDENT,
            time_stamp: false,
            color_paste: false,
            refresh_ms: DEFAULT_REFRESH_MS,
            log_file_path: default_log_path(),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/chatscroll/chatscroll.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    match dirs::state_dir() {
        Some(state_dir) => state_dir.join("chatscroll").join("chatscroll.log"),
        None => PathBuf::from("chatscroll.log"),
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/chatscroll/config.toml` on Unix, appropriate path on
/// other platforms. Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("chatscroll").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `CHATSCROLL_CONFIG` environment variable
/// 3. Default path `~/.config/chatscroll/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var("CHATSCROLL_CONFIG") {
        if env_path.is_empty() {
            return Err(ConfigError::InvalidPath(
                "CHATSCROLL_CONFIG is set but empty".to_string(),
            ));
        }
        return load_config_file(PathBuf::from(env_path));
    }

    match default_config_path() {
        Some(default_path) => load_config_file(default_path),
        None => Ok(None),
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `CHATSCROLL_CAPACITY`: capacity in visual lines
/// - `CHATSCROLL_WORDWRAP`: `1`/`true`/`yes`/`on` or `0`/`false`/`no`/`off`
///
/// Unparseable values are logged and ignored.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(raw) = std::env::var("CHATSCROLL_CAPACITY") {
        match raw.trim().parse() {
            Ok(capacity) => config.capacity = capacity,
            Err(_) => warn!(value = %raw, "ignoring invalid CHATSCROLL_CAPACITY"),
        }
    }

    if let Ok(raw) = std::env::var("CHATSCROLL_WORDWRAP") {
        match parse_flag(&raw) {
            Some(wordwrap) => config.wordwrap = wordwrap,
            None => warn!(value = %raw, "ignoring invalid CHATSCROLL_WORDWRAP"),
        }
    }

    config
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        capacity: config.capacity.unwrap_or(defaults.capacity),
        wordwrap: config.wordwrap.unwrap_or(defaults.wordwrap),
        wrap_limit: config.wrap_limit.unwrap_or(defaults.wrap_limit),
        indent: config.indent.unwrap_or(defaults.indent),
        auto_indent: config.auto_indent.unwrap_or(defaults.auto_indent),
        max_auto_indent: config.max_auto_indent.unwrap_or(defaults.max_auto_indent),
        time_stamp: config.time_stamp.unwrap_or(defaults.time_stamp),
        color_paste: config.color_paste.unwrap_or(defaults.color_paste),
        refresh_ms: config.refresh_ms.unwrap_or(defaults.refresh_ms),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Flags given on the command line that override configuration.
///
/// `None`/`false` means the flag was not given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    /// `--capacity`
    pub capacity: Option<usize>,
    /// `--no-wordwrap`
    pub no_wordwrap: bool,
    /// `--timestamps`
    pub timestamps: bool,
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(mut config: ResolvedConfig, cli: &CliOverrides) -> ResolvedConfig {
    if let Some(capacity) = cli.capacity {
        config.capacity = capacity;
    }
    if cli.no_wordwrap {
        config.wordwrap = false;
    }
    if cli.timestamps {
        config.time_stamp = true;
    }
    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
