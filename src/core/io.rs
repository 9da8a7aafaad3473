//! Terminal I/O
//!
//! The engine talks to the terminal only through the [`Io`] trait: one key
//! per call, one raw byte per call for the cursor position protocol, string
//! writes and a window size query. [`StandardIo`] implements it on top of
//! stdin/stdout with crossterm handling raw mode and the size query.

use std::io::{self, Read, Write};
use std::path::PathBuf;

use crossterm::terminal;
use thiserror::Error;
use tracing::warn;

use super::key::Key;

#[derive(Error, Debug)]
pub enum TermError {
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("Could not read cursor position: {0}")]
    Position(String),

    #[error("History file {}: {source}", .path.display())]
    History {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, TermError>;

/// Size used when the terminal does not report one
pub const FALLBACK_SIZE: Size = Size { cols: 160, rows: 24 };

/// Bytes captured by a single key read
const KEY_BUFFER_LEN: usize = 16;

/// Terminal size in character cells
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub cols: usize,
    pub rows: usize,
}

/// Input source and output sink of a session
pub trait Io {
    /// Block until one key arrives
    fn get_key(&mut self) -> Result<Key>;

    /// Block until one raw byte arrives, `None` on end of input or error
    fn get_char(&mut self) -> Option<u8>;

    /// Write every byte of `data` or fail
    fn write(&mut self, data: &str) -> Result<()>;

    /// Current window size, [`FALLBACK_SIZE`] when the query fails
    fn window_size(&self) -> Size;
}

/// Raw mode held for the lifetime of the guard
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    pub fn enable() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("Failed to restore terminal mode: {}", e);
        }
    }
}

/// Stdin/stdout backed terminal.
///
/// Raw mode is only held while a read is blocked, so everything written in
/// between goes through normal output processing.
#[derive(Default)]
pub struct StandardIo;

impl StandardIo {
    pub fn new() -> Self {
        Self
    }
}

impl Io for StandardIo {
    fn get_key(&mut self) -> Result<Key> {
        io::stdout().flush()?;
        let mut buf = [0u8; KEY_BUFFER_LEN];
        let len = {
            let _raw = RawModeGuard::enable()?;
            read_retrying(&mut buf)
        };
        match len {
            Ok(len) => Ok(Key::from_bytes(&buf[..len])),
            // A dead input behaves like Ctrl-D
            Err(e) => {
                warn!("Key read failed: {}", e);
                Ok(Key::ctrl('d'))
            }
        }
    }

    fn get_char(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        let _raw = RawModeGuard::enable().ok()?;
        match read_retrying(&mut byte) {
            Ok(1) => Some(byte[0]),
            _ => None,
        }
    }

    fn write(&mut self, data: &str) -> Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(data.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }

    fn window_size(&self) -> Size {
        match terminal::size() {
            Ok((cols, rows)) => Size {
                cols: if cols > 1 { cols as usize } else { FALLBACK_SIZE.cols },
                rows: if rows > 1 { rows as usize } else { FALLBACK_SIZE.rows },
            },
            Err(_) => FALLBACK_SIZE,
        }
    }
}

fn read_retrying(buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match io::stdin().read(buf) {
            Err(e) if matches!(e.kind(), io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock) => continue,
            result => return result,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedIo;
    use super::*;

    #[test]
    fn test_scripted_keys_run_out_as_ctrl_d() {
        let mut io = ScriptedIo::at_row(1).with_typed("a");
        assert_eq!(io.get_key().unwrap(), Key::Code(b'a'));
        assert_eq!(io.get_key().unwrap(), Key::ctrl('d'));
    }

    #[test]
    fn test_write_failure_is_io_error() {
        let mut io = ScriptedIo::at_row(1).failing_writes();
        assert!(matches!(io.write("x"), Err(TermError::Io(_))));
    }

    #[test]
    fn test_error_messages() {
        let err = TermError::Position("garbage".to_string());
        assert_eq!(err.to_string(), "Could not read cursor position: garbage");
    }
}
