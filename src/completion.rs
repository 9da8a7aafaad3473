//! Prefix completion
//!
//! Candidate words live in a sorted set. Prefix matches are a contiguous
//! range of that set, and the longest common prefix of a sorted match list
//! is the common prefix of its first and last element.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::ops::Bound;

use tracing::debug;

use crate::core::{Cursor, Io, Key, Line, Result, Status};

/// Spaces between listed candidates
const COLUMN_GUTTER: usize = 2;

/// Outcome of a prefix search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    /// Matched words in sorted order
    pub words: Vec<String>,
    pub shortest_word_len: usize,
    pub longest_word_len: usize,
    /// Empty unless two or more words matched a non-empty phrase
    pub common_prefix: String,
}

impl SearchResult {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Word index plus the trigger-key listener state
#[derive(Debug)]
pub struct Completion {
    words: BTreeSet<String>,
    longest_word_len: usize,
    trigger: Key,
    presses: u16,
}

impl Default for Completion {
    fn default() -> Self {
        Self::new()
    }
}

impl Completion {
    pub fn new() -> Self {
        Self {
            words: BTreeSet::new(),
            longest_word_len: 0,
            trigger: Key::TAB,
            presses: 0,
        }
    }

    /// Key that triggers completion
    pub fn trigger(&self) -> &Key {
        &self.trigger
    }

    pub fn insert(&mut self, word: &str) {
        self.longest_word_len = self.longest_word_len.max(word.len());
        self.words.insert(word.to_string());
    }

    pub fn extend<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            self.insert(word.as_ref());
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Forget earlier trigger presses
    pub fn reset(&mut self) {
        self.presses = 0;
    }

    /// Find every word starting with `phrase`
    pub fn search(&self, phrase: &str) -> SearchResult {
        if phrase.is_empty() {
            return SearchResult {
                words: self.words.iter().cloned().collect(),
                shortest_word_len: 0,
                longest_word_len: self.longest_word_len,
                common_prefix: String::new(),
            };
        }

        let mut result = SearchResult {
            shortest_word_len: self.longest_word_len,
            ..SearchResult::default()
        };
        let matches = self
            .words
            .range::<str, _>((Bound::Included(phrase), Bound::Unbounded))
            .take_while(|word| word.starts_with(phrase));
        for word in matches {
            result.longest_word_len = result.longest_word_len.max(word.len());
            result.shortest_word_len = result.shortest_word_len.min(word.len());
            result.words.push(word.clone());
        }

        if result.len() < 2 {
            return result;
        }

        // Sorted matches: first and last bound the common prefix of all
        if let (Some(first), Some(last)) = (result.words.first(), result.words.last()) {
            let len: usize = first
                .chars()
                .zip(last.chars())
                .take_while(|(a, b)| a == b)
                .map(|(a, _)| a.len_utf8())
                .sum();
            result.common_prefix = first[..len.min(result.shortest_word_len)].to_string();
        }
        result
    }

    /// Completion-trigger key handling.
    ///
    /// Any other key resets the repeat counter. On the trigger key a lone
    /// match replaces the content (plus a trailing space); several matches
    /// fill in their common prefix and get listed below the line.
    pub fn on_key(&mut self, key: &Key, line: &mut Line, cursor: &mut Cursor, io: &mut dyn Io) -> Result<Status> {
        if *key != self.trigger {
            self.presses = 0;
            return Ok(Status::Ok);
        }

        self.presses = self.presses.saturating_add(1);
        let phrase = line.content().to_string();
        if self.presses == 1 && phrase.is_empty() {
            io.write("\x07")?;
            return Ok(Status::Ok);
        }

        let result = self.search(&phrase);
        debug!("Completion of {:?}: {} candidates", phrase, result.len());
        if result.is_empty() {
            return Ok(Status::Ok);
        }

        if let [word] = result.words.as_slice() {
            line.set_content(word);
            line.push(' ');
        } else {
            if !result.common_prefix.is_empty() {
                line.set_content(&result.common_prefix);
            }
            let cols = io.window_size().cols;
            io.write(&format_columns(&result.words, result.longest_word_len, cols))?;
            // The listing scrolls, redraw the line below it
            cursor.refresh_row(io)?;
        }

        self.presses = 0;
        line.update(io)?;
        cursor.move_to_end(line, io)?;
        Ok(Status::Ok)
    }
}

/// Lay candidates out in fixed-width columns that fit `cols`
pub fn format_columns(words: &[String], longest_word_len: usize, cols: usize) -> String {
    let width = longest_word_len + COLUMN_GUTTER;
    let mut out = String::from("\n");
    let mut line_width = 0;
    for word in words {
        if line_width + width >= cols {
            out.push('\n');
            line_width = 0;
        }
        line_width += width;
        let _ = write!(out, "{:<width$}", word, width = width);
    }
    out.push('\n');
    out
}
