//! Line input sources.
//!
//! - [`FileSource`]: read-once file input
//! - [`StdinSource`]: piped input that may keep growing
//! - [`InputSource`]: one of the two, behind a common interface

use crate::model::error::InputError;
use std::path::PathBuf;

pub mod file;
pub mod stdin;

pub use file::FileSource;
pub use stdin::StdinSource;

/// Where lines come from.
#[derive(Debug)]
pub enum InputSource {
    /// A file, loaded once.
    File(FileSource),
    /// Piped stdin.
    Stdin(StdinSource),
}

impl InputSource {
    /// Lines that are ready, as raw bytes without the newline.
    ///
    /// Non-blocking. A file yields everything on the first call; stdin yields
    /// whatever has arrived.
    ///
    /// # Errors
    ///
    /// Returns `InputError` for I/O errors.
    pub fn poll(&mut self) -> Result<Vec<Vec<u8>>, InputError> {
        match self {
            InputSource::File(f) => Ok(f.drain_lines()),
            InputSource::Stdin(s) => s.poll(),
        }
    }

    /// Whether more lines may still arrive.
    pub fn is_live(&self) -> bool {
        match self {
            InputSource::File(_) => false,
            InputSource::Stdin(s) => !s.is_complete(),
        }
    }
}

/// Open `file` if given, otherwise stdin.
///
/// # Errors
///
/// `InputError::FileNotFound` for a missing file, `InputError::NoInput` when
/// no file is given and stdin is a terminal, `InputError::Io` otherwise.
pub fn detect_input_source(file: Option<PathBuf>) -> Result<InputSource, InputError> {
    match file {
        Some(path) => Ok(InputSource::File(FileSource::new(path)?)),
        None => Ok(InputSource::Stdin(StdinSource::new()?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::IsTerminal;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn file_source_polls_once_and_is_never_live() {
        let test_file = std::env::temp_dir().join("chatscroll_detect_existing.log");
        fs::write(&test_file, "<nick>\thello\nplain line\n").unwrap();

        let mut source = detect_input_source(Some(test_file.clone())).unwrap();
        let _ = fs::remove_file(&test_file);

        assert!(matches!(source, InputSource::File(_)));
        assert!(!source.is_live(), "File sources are never live");
        assert_eq!(source.poll().unwrap().len(), 2);
        assert!(source.poll().unwrap().is_empty());
    }

    #[test]
    fn stdin_source_goes_quiet_after_eof() {
        let mut source = InputSource::Stdin(StdinSource::from_reader(&b"a\nb\n"[..]));
        let mut lines = Vec::new();
        for _ in 0..200 {
            lines.extend(source.poll().unwrap());
            if !source.is_live() {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(lines, vec![b"a".to_vec(), b"b".to_vec()]);
        assert!(!source.is_live());
    }

    #[test]
    fn detect_returns_file_not_found_for_missing_file() {
        let missing = std::env::temp_dir().join("chatscroll_nonexistent_detect.log");
        let result = detect_input_source(Some(missing.clone()));
        assert!(
            matches!(&result, Err(InputError::FileNotFound { path }) if *path == missing),
            "got: {:?}",
            result
        );
    }

    #[test]
    fn detect_returns_no_input_when_stdin_is_tty() {
        if std::io::stdin().is_terminal() {
            assert!(matches!(detect_input_source(None), Err(InputError::NoInput)));
        }
    }
}
