//! Read-once file source.

use crate::model::error::InputError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Lines of a file, loaded once at construction.
///
/// Bytes are kept as they are on disk; attribute codes and invalid UTF-8
/// pass through to the scrollback untouched.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    lines: Vec<Vec<u8>>,
    drained: bool,
}

impl FileSource {
    /// Read `path` and split it into lines.
    ///
    /// # Errors
    ///
    /// Returns `InputError::FileNotFound` if the file does not exist and
    /// `InputError::Io` for other read failures.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InputError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let bytes = std::fs::read(path)?;
        let lines = split_lines(&bytes);
        debug!(path = %path.display(), lines = lines.len(), "loaded input file");

        Ok(Self {
            path: path.to_path_buf(),
            lines,
            drained: false,
        })
    }

    /// Path the lines were read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All lines on the first call, nothing afterwards.
    pub fn drain_lines(&mut self) -> Vec<Vec<u8>> {
        if self.drained {
            return Vec::new();
        }
        self.drained = true;
        std::mem::take(&mut self.lines)
    }
}

/// Split on `\n`, dropping one trailing `\r` per line.
///
/// A final newline does not produce an empty last line.
pub fn split_lines(bytes: &[u8]) -> Vec<Vec<u8>> {
    if bytes.is_empty() {
        return Vec::new();
    }
    let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    body.split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line).to_vec())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn split_lines_handles_trailing_newline() {
        assert_eq!(split_lines(b"a\nb\n"), vec![b"a".to_vec(), b"b".to_vec()]);
        assert_eq!(split_lines(b"a\nb"), vec![b"a".to_vec(), b"b".to_vec()]);
    }

    #[test]
    fn split_lines_keeps_blank_lines_and_codes() {
        let lines = split_lines(b"\x034red\r\n\n\x02bold\n");
        assert_eq!(
            lines,
            vec![b"\x034red".to_vec(), Vec::new(), b"\x02bold".to_vec()]
        );
    }

    #[test]
    fn split_lines_empty_input_has_no_lines() {
        assert!(split_lines(b"").is_empty());
    }

    #[test]
    fn drain_lines_returns_everything_once() {
        let test_file = std::env::temp_dir().join("chatscroll_file_source_drain.log");
        fs::write(&test_file, b"one\ntwo\nthree\n").unwrap();

        let mut source = FileSource::new(&test_file).unwrap();
        let _ = fs::remove_file(&test_file);

        assert_eq!(source.drain_lines().len(), 3);
        assert!(source.drain_lines().is_empty(), "Second drain should be empty");
    }

    #[test]
    fn invalid_utf8_is_preserved() {
        let test_file = std::env::temp_dir().join("chatscroll_file_source_latin1.log");
        fs::write(&test_file, b"caf\xe9\n").unwrap();

        let mut source = FileSource::new(&test_file).unwrap();
        let _ = fs::remove_file(&test_file);

        assert_eq!(source.drain_lines(), vec![b"caf\xe9".to_vec()]);
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let missing = std::env::temp_dir().join("chatscroll_missing_12345.log");
        let result = FileSource::new(&missing);
        assert!(matches!(result, Err(InputError::FileNotFound { path }) if path == missing));
    }
}
