//! Cursor position protocol
//!
//! Screen coordinates are 1-based, buffer offsets are 0-based: the cursor
//! at column `col` sits in front of buffer byte `col - 1`. The row is
//! discovered with a `ESC[6n` query and only queried again when output
//! written below the line has scrolled it.

use crossterm::cursor::MoveTo;
use crossterm::Command;
use tracing::debug;

use super::io::{Io, Result, TermError};
use super::line::Line;

/// Cursor position query
const POSITION_QUERY: &str = "\x1b[6n";

/// Upper bound on the bytes of a position report
const POSITION_REPORT_MAX: usize = 31;

/// On-screen position of the editing cursor for one read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    row: usize,
    col: usize,
}

impl Cursor {
    /// Discover the current row and park the cursor right after the prompt
    pub fn new(line: &Line, io: &mut dyn Io) -> Result<Self> {
        let (row, col) = read_position(io)?;
        debug!("Cursor position reported at {};{}", row, col);
        let mut cursor = Self { row, col };
        cursor.move_to_home(line, io)?;
        Ok(cursor)
    }

    /// Query the row again, for when output below the line moved the prompt
    pub fn refresh_row(&mut self, io: &mut dyn Io) -> Result<()> {
        let (row, _) = read_position(io)?;
        debug!("Cursor row moved from {} to {}", self.row, row);
        self.row = row;
        Ok(())
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    /// Content offset of the cursor, 0 right after the prompt
    pub fn offset(&self, line: &Line) -> usize {
        self.col.saturating_sub(line.prompt().len() + 1)
    }

    pub fn move_left(&mut self, line: &Line, io: &mut dyn Io) -> Result<()> {
        if self.col > home_col(line) {
            self.col -= 1;
            self.reposition(io)?;
        }
        Ok(())
    }

    pub fn move_right(&mut self, line: &Line, io: &mut dyn Io) -> Result<()> {
        if self.col < end_col(line) {
            self.col += 1;
            self.reposition(io)?;
        }
        Ok(())
    }

    pub fn move_to_home(&mut self, line: &Line, io: &mut dyn Io) -> Result<()> {
        self.col = home_col(line);
        self.reposition(io)
    }

    pub fn move_to_end(&mut self, line: &Line, io: &mut dyn Io) -> Result<()> {
        self.col = end_col(line);
        self.reposition(io)
    }

    /// Insert `c` under the cursor and step past it
    pub fn put_char(&mut self, line: &mut Line, c: char, io: &mut dyn Io) -> Result<()> {
        let inserted = line.insert(self.col - 1, c);
        line.update(io)?;
        if inserted {
            self.col += c.len_utf8();
        }
        self.reposition(io)
    }

    /// Delete the character left of the cursor (backspace)
    pub fn eat_char(&mut self, line: &mut Line, io: &mut dyn Io) -> Result<()> {
        if self.col <= home_col(line) {
            return Ok(());
        }
        line.remove(self.col - 2);
        line.update(io)?;
        self.col -= 1;
        self.reposition(io)
    }

    fn reposition(&self, io: &mut dyn Io) -> Result<()> {
        let mut out = String::new();
        // MoveTo takes 0-based (column, row)
        let _ = MoveTo(screen(self.col - 1), screen(self.row - 1)).write_ansi(&mut out);
        io.write(&out)
    }
}

fn home_col(line: &Line) -> usize {
    line.prompt().len() + 1
}

fn end_col(line: &Line) -> usize {
    line.len() + 1
}

fn screen(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Query the terminal and parse its `ESC [ row ; col R` answer
fn read_position(io: &mut dyn Io) -> Result<(usize, usize)> {
    io.write(POSITION_QUERY)?;
    let mut report = Vec::with_capacity(POSITION_REPORT_MAX);
    while report.len() < POSITION_REPORT_MAX {
        match io.get_char() {
            Some(byte) => {
                report.push(byte);
                if byte == b'R' {
                    break;
                }
            }
            None => break,
        }
    }
    parse_position_report(&report)
        .ok_or_else(|| TermError::Position(String::from_utf8_lossy(&report).escape_debug().to_string()))
}

fn parse_position_report(report: &[u8]) -> Option<(usize, usize)> {
    let body = report.strip_prefix(b"\x1b[")?.strip_suffix(b"R")?;
    let body = std::str::from_utf8(body).ok()?;
    let (row, col) = body.split_once(';')?;
    let row = row.parse::<usize>().ok()?;
    let col = col.parse::<usize>().ok()?;
    // Reports are 1-based
    if row == 0 || col == 0 {
        return None;
    }
    Some((row, col))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::testing::ScriptedIo;
    use crate::style::TextStyle;

    fn setup(prompt: &str) -> (ScriptedIo, Line) {
        (ScriptedIo::at_row(5), Line::new(prompt, TextStyle::default(), TextStyle::default()))
    }

    #[test]
    fn test_position_discovery() {
        let (mut io, line) = setup("> ");
        let output = io.output();
        let cursor = Cursor::new(&line, &mut io).unwrap();
        assert_eq!(cursor.row(), 5);
        assert_eq!(cursor.col(), 3);
        assert_eq!(*output.borrow(), "\x1b[6n\x1b[5;3H");
    }

    #[test]
    fn test_position_report_parsing() {
        assert_eq!(parse_position_report(b"\x1b[12;40R"), Some((12, 40)));
        assert_eq!(parse_position_report(b"\x1b[1;1R"), Some((1, 1)));
        assert_eq!(parse_position_report(b"\x1b[12R"), None);
        assert_eq!(parse_position_report(b"\x1b[a;1R"), None);
        assert_eq!(parse_position_report(b"[3;4R"), None);
        assert_eq!(parse_position_report(b"\x1b[3;4"), None);
    }

    #[test]
    fn test_position_error_on_eof() {
        let (io, line) = setup("> ");
        let mut io = io.with_raw_chars(b"\x1b[3;");
        let err = Cursor::new(&line, &mut io).unwrap_err();
        assert!(matches!(err, TermError::Position(_)));
    }

    #[test]
    fn test_refresh_row_keeps_column() {
        let (io, line) = setup("> ");
        let mut io = io.with_raw_chars(b"\x1b[2;1R\x1b[9;40R");
        let mut cursor = Cursor::new(&line, &mut io).unwrap();
        cursor.refresh_row(&mut io).unwrap();
        assert_eq!(cursor.row(), 9);
        assert_eq!(cursor.col(), 3);
    }

    #[test]
    fn test_moves_are_clamped() {
        let (mut io, mut line) = setup("> ");
        let mut cursor = Cursor::new(&line, &mut io).unwrap();

        cursor.move_left(&line, &mut io).unwrap();
        assert_eq!(cursor.col(), 3);

        line.append("ab");
        cursor.move_right(&line, &mut io).unwrap();
        cursor.move_right(&line, &mut io).unwrap();
        cursor.move_right(&line, &mut io).unwrap();
        assert_eq!(cursor.col(), 5);
        assert_eq!(cursor.offset(&line), 2);

        cursor.move_to_home(&line, &mut io).unwrap();
        assert_eq!(cursor.col(), 3);
        cursor.move_to_end(&line, &mut io).unwrap();
        assert_eq!(cursor.col(), 5);
    }

    #[test]
    fn test_put_char_inserts_under_cursor() {
        let (mut io, mut line) = setup("> ");
        let mut cursor = Cursor::new(&line, &mut io).unwrap();
        cursor.put_char(&mut line, 'a', &mut io).unwrap();
        cursor.put_char(&mut line, 'c', &mut io).unwrap();
        cursor.move_left(&line, &mut io).unwrap();
        cursor.put_char(&mut line, 'b', &mut io).unwrap();
        assert_eq!(line.content(), "abc");
        assert_eq!(cursor.col(), 5);
    }

    #[test]
    fn test_eat_char() {
        let (mut io, mut line) = setup("> ");
        let output = io.output();
        let mut cursor = Cursor::new(&line, &mut io).unwrap();

        // Nothing to delete at the prompt boundary
        output.borrow_mut().clear();
        cursor.eat_char(&mut line, &mut io).unwrap();
        assert_eq!(*output.borrow(), "");

        for c in "abc".chars() {
            cursor.put_char(&mut line, c, &mut io).unwrap();
        }
        cursor.move_left(&line, &mut io).unwrap();
        cursor.eat_char(&mut line, &mut io).unwrap();
        assert_eq!(line.content(), "ac");
        assert_eq!(cursor.col(), 4);
        assert!(output.borrow().ends_with("\x1b[5;4H"));
    }
}
