//! Line history for termline
//!
//! Provides a bounded, deduplicating, most-recent-first log of committed
//! lines with a navigation pointer for arrow-key recall, and optional
//! persistence to a plain text file.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::{Result, TermError};

/// Default maximum number of history entries
pub const HISTORY_LIMIT: usize = 128;

/// Committed line storage
#[derive(Debug)]
pub struct History {
    /// All entries (newest first)
    lines: VecDeque<String>,
    /// Maximum entries
    limit: usize,
    /// Navigation position, `None` while editing the live line
    index: Option<usize>,
    /// The live line saved when navigation starts
    top_line: String,
    /// File path for persistence
    file_path: Option<PathBuf>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(HISTORY_LIMIT)
    }
}

impl History {
    /// Create an in-memory history
    pub fn new(limit: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            limit,
            index: None,
            top_line: String::new(),
            file_path: None,
        }
    }

    /// Create a history persisted to `path`
    pub fn with_file(path: impl Into<PathBuf>, limit: usize) -> Self {
        Self {
            file_path: Some(path.into()),
            ..Self::new(limit)
        }
    }

    /// Get default history file path (`~/.termline/history`)
    pub fn default_path() -> Option<PathBuf> {
        crate::config::data_dir().map(|dir| dir.join("history"))
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Add a committed line
    pub fn insert(&mut self, line: &str) {
        if line.is_empty() {
            return;
        }

        // Same as the newest entry
        if self.lines.front().map(String::as_str) == Some(line) {
            return;
        }

        // Already known, move it to the front
        if let Some(pos) = self.lines.iter().position(|l| l == line) {
            if let Some(existing) = self.lines.remove(pos) {
                self.lines.push_front(existing);
            }
            return;
        }

        self.lines.push_front(line.to_string());
        while self.lines.len() > self.limit {
            if let Some(evicted) = self.lines.pop_back() {
                debug!("History full, evicted {:?}", evicted);
            }
        }
    }

    /// Entries, newest first
    pub fn lines(&self) -> &VecDeque<String> {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.index = None;
    }

    /// Stop navigating, back to the live line
    pub fn rewind(&mut self) {
        self.index = None;
    }

    /// Whether navigation has moved off the live line
    pub fn is_manipulated(&self) -> bool {
        self.index.is_some()
    }

    /// Remember the in-progress line before navigating away from it
    pub fn set_top_line(&mut self, line: &str) {
        self.top_line = line.to_string();
    }

    pub fn current_line(&self) -> &str {
        match self.index.and_then(|i| self.lines.get(i)) {
            Some(line) => line,
            None => &self.top_line,
        }
    }

    /// Step to an older entry, stays put on the oldest
    pub fn next(&mut self) -> &str {
        let next = self.index.map_or(0, |i| i + 1);
        if next < self.lines.len() {
            self.index = Some(next);
        }
        self.current_line()
    }

    /// Step to a newer entry, ends on the live line
    pub fn prev(&mut self) -> &str {
        self.index = match self.index {
            Some(0) | None => None,
            Some(i) => Some(i - 1),
        };
        self.current_line()
    }

    /// Load entries from the history file.
    ///
    /// Lines are inserted in reading order, so the last line of the file
    /// becomes the newest entry. A missing file is an empty history.
    pub fn load(&mut self) -> Result<()> {
        let Some(path) = self.file_path.clone() else {
            return Ok(());
        };
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(source) => return Err(TermError::History { path, source }),
        };
        for line in content.lines() {
            self.insert(line);
        }
        info!("Loaded {} history entries from {}", self.lines.len(), path.display());
        Ok(())
    }

    /// Save entries to the history file, oldest first
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };
        let mut content = String::new();
        for line in self.lines.iter().rev() {
            content.push_str(line);
            content.push('\n');
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| TermError::History {
                    path: path.clone(),
                    source,
                })?;
            }
        }
        fs::write(path, content).map_err(|source| TermError::History {
            path: path.clone(),
            source,
        })?;
        debug!("Saved {} history entries to {}", self.lines.len(), path.display());
        Ok(())
    }
}
