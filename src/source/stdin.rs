//! Stdin source for piped input.
//!
//! A background thread reads lines and forwards them over a channel so the
//! event loop can poll without blocking.

use crate::model::error::InputError;
use std::io::{BufRead, BufReader, IsTerminal, Read};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use tracing::{debug, warn};

enum Chunk {
    Line(Vec<u8>),
    Failed(std::io::Error),
}

/// Lines arriving on a pipe, like `tail -f chat.log | chatscroll`.
///
/// # Design
///
/// - Refuses a TTY at construction so the viewer never waits on the keyboard
/// - Non-blocking [`poll`](Self::poll) for the event loop
/// - [`is_complete`](Self::is_complete) once the writer closes the pipe
pub struct StdinSource {
    rx: Receiver<Chunk>,
    complete: bool,
}

impl std::fmt::Debug for StdinSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StdinSource")
            .field("complete", &self.complete)
            .finish_non_exhaustive()
    }
}

impl StdinSource {
    /// Start reading from the process's stdin.
    ///
    /// # Errors
    ///
    /// Returns `InputError::NoInput` if stdin is an interactive terminal.
    pub fn new() -> Result<Self, InputError> {
        if std::io::stdin().is_terminal() {
            return Err(InputError::NoInput);
        }
        Ok(Self::from_reader(std::io::stdin()))
    }

    /// Start reading from any reader.
    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut reader = BufReader::new(reader);
            loop {
                let mut line = Vec::new();
                match reader.read_until(b'\n', &mut line) {
                    Ok(0) => break,
                    Ok(_) => {
                        if line.last() == Some(&b'\n') {
                            line.pop();
                            if line.last() == Some(&b'\r') {
                                line.pop();
                            }
                        }
                        if tx.send(Chunk::Line(line)).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        let _ = tx.send(Chunk::Failed(err));
                        break;
                    }
                }
            }
            debug!("stdin reader finished");
        });
        Self {
            rx,
            complete: false,
        }
    }

    /// Every line that has arrived since the last call.
    ///
    /// Never blocks. Returns an empty vec when nothing is pending.
    ///
    /// # Errors
    ///
    /// Returns `InputError::Io` if the reader thread hit a read error. The
    /// source is complete afterwards.
    pub fn poll(&mut self) -> Result<Vec<Vec<u8>>, InputError> {
        let mut lines = Vec::new();
        while !self.complete {
            match self.rx.try_recv() {
                Ok(Chunk::Line(line)) => lines.push(line),
                Ok(Chunk::Failed(err)) => {
                    warn!(error = %err, "stdin read failed");
                    self.complete = true;
                    return Err(InputError::Io(err));
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => self.complete = true,
            }
        }
        Ok(lines)
    }

    /// True once the pipe is closed and every line has been polled.
    pub fn is_complete(&self) -> bool {
        self.complete
    }
}
