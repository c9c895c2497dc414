//! Error types for chatscroll.
//!
//! The taxonomy is layered with `thiserror`:
//!
//! - [`AppError`] - top-level failures of the binary
//!   - [`InputError`] - reading lines from a file or stdin
//!   - [`ConfigError`](crate::config::ConfigError) - loading the TOML config
//!   - `std::io::Error` - terminal and export failures
//! - [`EngineError`] - checked lookups into the scrollback
//!
//! Nothing inside the engine is fatal. Degenerate wraps are forced, selection
//! offsets are clamped and stale ids resolve to "not found". `EngineError`
//! exists only for callers that prefer a `Result` over an `Option`.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::model::EntryId;

/// Top-level application error.
///
/// Domain errors convert via `From`, so `main` can use `?` throughout.
#[derive(Debug, Error)]
pub enum AppError {
    /// Failed to read input from file or stdin.
    ///
    /// Fatal: there is nothing to display without input.
    #[error("Failed to read input: {0}")]
    InputRead(#[from] InputError),

    /// The configuration file could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Terminal or export I/O error.
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Errors encountered when reading lines from files or stdin.
#[derive(Debug, Error)]
pub enum InputError {
    /// The specified file does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use chatscroll::model::error::InputError;
    ///
    /// let err = InputError::FileNotFound {
    ///     path: PathBuf::from("/tmp/missing.log")
    /// };
    /// assert!(err.to_string().contains("/tmp/missing.log"));
    /// ```
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that failed to open.
        path: PathBuf,
    },

    /// No file argument was given and stdin is a terminal.
    #[error("No input source: provide a file path or pipe data to stdin")]
    NoInput,

    /// Any other I/O failure while reading.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failed checked lookup into the scrollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A visual line number past the end of the scrollback.
    #[error("visual line {line} out of range (total {total})")]
    OutOfRange {
        /// Requested absolute visual line.
        line: usize,
        /// Visual lines currently in the store.
        total: usize,
    },

    /// An entry id that was evicted or cleared.
    #[error("entry {0} is no longer in the scrollback")]
    StaleEntry(EntryId),
}
