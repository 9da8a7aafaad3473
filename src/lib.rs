//! termline - interactive line editing for terminals
//!
//! Reads one line at a time from a raw-mode terminal with in-place editing,
//! arrow-key history recall, prefix completion and pluggable listeners for
//! key presses, line changes and committed lines.
//!
//! ```no_run
//! use termline::{Session, StandardIo, Status};
//!
//! let mut session = Session::new(StandardIo::new());
//! session.on_line_entered(|line, session| {
//!     session.write_text(&format!("you said {:?}\n", line))?;
//!     Ok(Status::Ok)
//! });
//! session.run("> ")?;
//! # Ok::<(), termline::TermError>(())
//! ```

pub mod completion;
pub mod config;
pub mod core;
pub mod history;
pub mod style;

pub use crate::completion::{Completion, SearchResult};
pub use crate::config::Config;
pub use crate::core::{
    Cursor, Io, Key, KeyPressedListener, Line, LineChangedListener, LineEnteredListener, Result, Session, Size,
    StandardIo, Status, TermError,
};
pub use crate::history::History;
pub use crate::style::{Color, CursorStyle, FontStyle, RgbColor, TextStyle};
