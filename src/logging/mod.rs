//! Tracing subscriber initialization.
//!
//! The viewer owns the terminal, so logs go to a file. Follow them with
//! `tail -f ~/.local/state/chatscroll/chatscroll.log`.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Error type for logging initialization failures.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Failed to create log directory
    #[error("Failed to create log directory at {path:?}: {source}")]
    DirectoryCreation {
        /// The directory path that failed to be created
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Log path has no usable file name
    #[error("Invalid log file path: {0:?}")]
    InvalidPath(PathBuf),

    /// Tracing subscriber already initialized
    #[error("Tracing subscriber already initialized")]
    SubscriberAlreadySet,
}

/// Split `log_path` into directory and file name, creating the directory.
///
/// A bare file name logs into the current directory.
pub fn prepare_log_file(log_path: &Path) -> Result<(PathBuf, String), LoggingError> {
    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LoggingError::InvalidPath(log_path.to_path_buf()))?
        .to_string();

    let directory = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    std::fs::create_dir_all(&directory).map_err(|source| LoggingError::DirectoryCreation {
        path: directory.clone(),
        source,
    })?;

    Ok((directory, file_name))
}

/// Initialize the tracing subscriber with file-based logging.
///
/// Respects `RUST_LOG`, falling back to [`DEFAULT_FILTER`]. The log directory
/// is created if it doesn't exist.
///
/// # Errors
///
/// Fails if the directory cannot be created or a subscriber is already set.
pub fn init(log_path: &Path) -> Result<(), LoggingError> {
    let (directory, file_name) = prepare_log_file(log_path)?;
    let file_appender = tracing_appender::rolling::never(directory, file_name);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|_| LoggingError::SubscriberAlreadySet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn prepare_log_file_creates_missing_directory() {
        let test_dir = std::env::temp_dir().join("chatscroll_test_logs_create");
        let _ = fs::remove_dir_all(&test_dir);

        let (dir, name) = prepare_log_file(&test_dir.join("nested").join("view.log"))
            .expect("prepare log file");

        assert!(dir.exists(), "Log directory should be created: {:?}", dir);
        assert_eq!(dir, test_dir.join("nested"));
        assert_eq!(name, "view.log");

        let _ = fs::remove_dir_all(&test_dir);
    }

    #[test]
    fn prepare_log_file_uses_current_directory_for_bare_name() {
        let (dir, name) = prepare_log_file(Path::new("chatscroll.log")).expect("prepare");
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(name, "chatscroll.log");
    }

    #[test]
    fn prepare_log_file_rejects_path_without_file_name() {
        let result = prepare_log_file(Path::new("/"));
        assert!(matches!(result, Err(LoggingError::InvalidPath(_))));
    }

    #[test]
    #[serial(tracing_init)]
    fn second_init_reports_subscriber_already_set() {
        let test_dir = std::env::temp_dir().join("chatscroll_test_logs_twice");
        let log_file = test_dir.join("twice.log");

        // The first call may already lose to another test in this process.
        let _ = init(&log_file);
        let second = init(&log_file);

        assert!(matches!(second, Err(LoggingError::SubscriberAlreadySet)));
        assert!(test_dir.exists());

        let _ = fs::remove_dir_all(&test_dir);
    }
}
