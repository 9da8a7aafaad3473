//! Core line editing components.
//!
//! - **key**: decoded keystrokes and the named key constants
//! - **io**: terminal I/O abstraction and the stdin/stdout implementation
//! - **line**: prompt + content buffer and its in-place rendering
//! - **cursor**: cursor position query and movement
//! - **listener**: event listener traits and dispatch
//! - **session**: read loop tying everything together
//!
//! # Architecture
//!
//! ```text
//! Session
//! ├── Io (keys in, escape sequences out)
//! ├── History
//! ├── Completion
//! ├── Listeners (key pressed / line changed / line entered)
//! └── per read_line call
//!     ├── Line
//!     └── Cursor
//! ```

pub mod cursor;
pub mod io;
pub mod key;
pub mod line;
pub mod listener;
pub mod session;

pub use cursor::Cursor;
pub use io::{Io, RawModeGuard, Result, Size, StandardIo, TermError, FALLBACK_SIZE};
pub use key::Key;
pub use line::Line;
pub use listener::{KeyPressedListener, LineChangedListener, LineEnteredListener, Listeners, Status};
pub use session::Session;
