//! Configuration management for termline.
//!
//! Settings are read from `~/.termline/config.toml`. Every field has a
//! default, so a partial (or missing) file is fine:
//!
//! ```toml
//! prompt = "termline> "
//!
//! [history]
//! limit = 128
//! persist = true
//! # file = "/tmp/termline_history"
//!
//! [style]
//! prompt_color = 2          # 256-color palette index
//! line_color = 7
//! cursor_color = "#00cd00"
//!
//! [completion]
//! words = ["help", "clear"]
//!
//! [log]
//! level = "info"
//! ```

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::history::HISTORY_LIMIT;
use crate::style::{Color, CursorStyle, RgbColor, TextStyle};

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Prompt shown in front of every line
    pub prompt: String,
    pub history: HistoryConfig,
    pub style: StyleConfig,
    pub completion: CompletionConfig,
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: "termline> ".to_string(),
            history: HistoryConfig::default(),
            style: StyleConfig::default(),
            completion: CompletionConfig::default(),
            log: LogConfig::default(),
        }
    }
}

/// History settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of entries kept
    pub limit: usize,
    /// History file, `~/.termline/history` when unset
    pub file: Option<PathBuf>,
    /// Load and save the history file
    pub persist: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: HISTORY_LIMIT,
            file: None,
            persist: true,
        }
    }
}

/// Colors of the prompt, the typed text and the cursor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub prompt_color: Option<u8>,
    pub line_color: Option<u8>,
    /// `#rrggbb`
    pub cursor_color: Option<String>,
}

impl StyleConfig {
    pub fn prompt_style(&self) -> TextStyle {
        text_style(self.prompt_color)
    }

    pub fn line_style(&self) -> TextStyle {
        text_style(self.line_color)
    }

    /// Cursor style, terminal default when unset or unparsable
    pub fn cursor_style(&self) -> CursorStyle {
        match self.cursor_color.as_deref() {
            Some(hex) => match RgbColor::parse_hex(hex) {
                Some(color) => CursorStyle::new(color),
                None => {
                    warn!("Ignoring invalid cursor color {:?}", hex);
                    CursorStyle::default()
                }
            },
            None => CursorStyle::default(),
        }
    }
}

fn text_style(index: Option<u8>) -> TextStyle {
    index.map_or_else(TextStyle::default, |i| TextStyle::new(Color::Indexed(i)))
}

/// Extra completion words
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub words: Vec<String>,
}

/// Log settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive, overridden by `TERMLINE_LOG`
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Self::default(),
        }
    }

    /// Load from `path`, defaults on any error
    pub fn load_from(path: &std::path::Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                warn!("Invalid config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                warn!("Could not read config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Get config file path
    pub fn config_path() -> Option<PathBuf> {
        data_dir().map(|dir| dir.join("config.toml"))
    }

    /// History file to use, `None` when persistence is off
    pub fn history_path(&self) -> Option<PathBuf> {
        if !self.history.persist {
            return None;
        }
        self.history.file.clone().or_else(crate::history::History::default_path)
    }
}

/// `~/.termline`, home of the config, history and log files
pub fn data_dir() -> Option<PathBuf> {
    home_dir().map(|home| home.join(".termline"))
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse(
            r##"
prompt = "db> "

[history]
limit = 16
persist = false

[style]
prompt_color = 2
cursor_color = "#00cd00"

[completion]
words = ["select", "insert"]
"##,
        )
        .unwrap();

        assert_eq!(config.prompt, "db> ");
        assert_eq!(config.history.limit, 16);
        assert_eq!(config.history_path(), None);
        assert_eq!(config.style.prompt_style(), TextStyle::new(Color::GREEN));
        assert!(config.style.line_style().is_default());
        assert_eq!(config.style.cursor_style(), CursorStyle::new(RgbColor::GREEN));
        assert_eq!(config.completion.words, ["select", "insert"]);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_invalid_cursor_color_falls_back() {
        let style = StyleConfig {
            cursor_color: Some("green".to_string()),
            ..StyleConfig::default()
        };
        assert_eq!(style.cursor_style(), CursorStyle::default());
    }

    #[test]
    fn test_explicit_history_file() {
        let config = Config::parse("[history]\nfile = \"/tmp/h\"\n").unwrap();
        assert_eq!(config.history_path(), Some(PathBuf::from("/tmp/h")));
    }

    #[test]
    fn test_load_from_bad_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "prompt = [").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
        assert_eq!(Config::load_from(&dir.path().join("missing.toml")), Config::default());
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut config = Config::default();
        config.completion.words.push("help".to_string());
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(Config::parse(&text).unwrap(), config);
    }
}
