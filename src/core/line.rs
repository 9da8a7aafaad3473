//! Line buffer
//!
//! Holds the prompt and the editable content in one string. All positions
//! are absolute byte offsets into that string, so the first content byte
//! sits at `prompt().len()`.

use super::io::{Io, Result};
use crate::style::{TextStyle, RESET};

/// Prompt + content of one read
#[derive(Debug, Default)]
pub struct Line {
    data: String,
    prompt_len: usize,
    prompt_style: TextStyle,
    content_style: TextStyle,
    /// Buffer length at the previous render
    rendered_len: usize,
}

impl Line {
    pub fn new(prompt: &str, prompt_style: TextStyle, content_style: TextStyle) -> Self {
        Self {
            data: prompt.to_string(),
            prompt_len: prompt.len(),
            prompt_style,
            content_style,
            rendered_len: 0,
        }
    }

    pub fn set_prompt_style(&mut self, style: TextStyle) {
        self.prompt_style = style;
    }

    pub fn set_content_style(&mut self, style: TextStyle) {
        self.content_style = style;
    }

    /// The full buffer, prompt included
    pub fn as_str(&self) -> &str {
        &self.data
    }

    pub fn prompt(&self) -> &str {
        &self.data[..self.prompt_len]
    }

    pub fn content(&self) -> &str {
        &self.data[self.prompt_len..]
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Insert `c` at `pos`.
    ///
    /// Positions outside `[prompt len, len]` or inside a multi-byte character
    /// are ignored; returns whether anything was inserted.
    pub fn insert(&mut self, pos: usize, c: char) -> bool {
        if pos < self.prompt_len || pos > self.data.len() || !self.data.is_char_boundary(pos) {
            return false;
        }
        self.data.insert(pos, c);
        true
    }

    /// Remove the character starting at `pos`.
    ///
    /// Positions outside `[prompt len, len)` or inside a multi-byte character
    /// are ignored.
    pub fn remove(&mut self, pos: usize) -> Option<char> {
        if pos < self.prompt_len || pos >= self.data.len() || !self.data.is_char_boundary(pos) {
            return None;
        }
        Some(self.data.remove(pos))
    }

    pub fn push(&mut self, c: char) {
        self.data.push(c);
    }

    pub fn append(&mut self, s: &str) {
        self.data.push_str(s);
    }

    /// Replace the content, keeping the prompt
    pub fn set_content(&mut self, content: &str) {
        self.data.truncate(self.prompt_len);
        self.data.push_str(content);
    }

    /// Redraw the line in place.
    ///
    /// Returns the carriage, draws prompt and content, then pads with spaces
    /// over whatever a longer previous render left behind.
    pub fn update(&mut self, io: &mut dyn Io) -> Result<()> {
        let mut out = String::with_capacity(self.data.len() + 32);
        out.push('\r');
        out.push_str(self.prompt_style.as_str());
        out.push_str(self.prompt());
        out.push_str(RESET);
        out.push_str(self.content_style.as_str());
        out.push_str(self.content());
        let stale = self.rendered_len.saturating_sub(self.data.len());
        out.extend(std::iter::repeat(' ').take(stale));
        out.push_str(RESET);
        io.write(&out)?;
        self.rendered_len = self.data.len();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::testing::ScriptedIo;
    use crate::style::Color;

    fn line(prompt: &str) -> Line {
        Line::new(prompt, TextStyle::default(), TextStyle::default())
    }

    #[test]
    fn test_new_line() {
        let line = line("");
        assert_eq!(line.len(), 0);
        assert_eq!(line.as_str(), "");

        let line = self::line("> ");
        assert_eq!(line.prompt(), "> ");
        assert_eq!(line.content(), "");
        assert_eq!(line.len(), 2);
    }

    #[test]
    fn test_append() {
        let mut line = line("");
        line.push('a');
        assert_eq!(line.as_str(), "a");
        line.append("abc");
        assert_eq!(line.len(), 4);
        assert_eq!(line.as_str(), "aabc");
    }

    #[test]
    fn test_insert() {
        let mut line = line("");
        line.append("simple");
        assert!(line.insert(0, '$'));
        assert_eq!(line.as_str(), "$simple");
        assert!(line.insert(4, '$'));
        assert_eq!(line.as_str(), "$sim$ple");
        assert!(line.insert(8, '$'));
        assert_eq!(line.as_str(), "$sim$ple$");
        assert!(!line.insert(10, '$'));
        assert_eq!(line.len(), 9);
    }

    #[test]
    fn test_remove() {
        let mut line = line("");
        line.append("simple");
        assert_eq!(line.remove(0), Some('s'));
        assert_eq!(line.as_str(), "imple");
        assert_eq!(line.remove(4), Some('e'));
        assert_eq!(line.as_str(), "impl");
        assert_eq!(line.remove(4), None);
    }

    #[test]
    fn test_prompt_is_never_touched() {
        let mut line = line("db> ");
        assert!(!line.insert(0, 'x'));
        assert!(!line.insert(3, 'x'));
        assert_eq!(line.remove(3), None);
        assert_eq!(line.remove(4), None);

        let ops: [(bool, usize); 10] = [
            (true, 4), (true, 5), (false, 0), (true, 1), (false, 4),
            (true, 6), (false, 2), (false, 5), (true, 9), (false, 3),
        ];
        for (insert, pos) in ops {
            if insert {
                line.insert(pos, 'z');
            } else {
                line.remove(pos);
            }
            assert_eq!(line.prompt(), "db> ");
            assert_eq!(line.len(), line.prompt().len() + line.content().len());
        }
    }

    #[test]
    fn test_set_content() {
        let mut line = line("> ");
        line.append("old");
        line.set_content("new content");
        assert_eq!(line.as_str(), "> new content");
        line.set_content("");
        assert_eq!(line.as_str(), "> ");
    }

    #[test]
    fn test_multibyte_positions_are_ignored() {
        let mut line = line("");
        line.set_content("é");
        assert!(!line.insert(1, 'x'));
        assert_eq!(line.remove(1), None);
        assert_eq!(line.remove(0), Some('é'));
    }

    #[test]
    fn test_update_pads_shorter_render() {
        let mut io = ScriptedIo::at_row(1);
        let output = io.output();
        let mut line = line("> ");
        line.append("abcd");
        line.update(&mut io).unwrap();
        assert_eq!(*output.borrow(), "\r> \x1b[0mabcd\x1b[0m");

        output.borrow_mut().clear();
        line.set_content("ab");
        line.update(&mut io).unwrap();
        assert_eq!(*output.borrow(), "\r> \x1b[0mab  \x1b[0m");
    }

    #[test]
    fn test_update_with_styles() {
        let mut io = ScriptedIo::at_row(1);
        let output = io.output();
        let mut line = Line::new("$ ", TextStyle::new(Color::GREEN), TextStyle::new(Color::BLUE));
        line.append("ls");
        line.update(&mut io).unwrap();
        assert_eq!(
            *output.borrow(),
            "\r\x1b[38;5;2m$ \x1b[0m\x1b[38;5;4mls\x1b[0m"
        );
    }
}
