//! Text and cursor styling
//!
//! Colors, font attributes and the escape prefixes the line renderer wraps
//! around the prompt and the content. Escape strings are produced with
//! crossterm commands wherever crossterm has one, so the byte format matches
//! what the rest of the terminal stack emits.

use bitflags::bitflags;
use crossterm::style::{Attribute, Color as AnsiColor, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::Command;

/// Resets every text attribute
pub const RESET: &str = "\x1b[0m";

/// 256-color palette entry, or the terminal's default color
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Color {
    #[default]
    Default,
    Indexed(u8),
}

impl Color {
    pub const BLACK: Color = Color::Indexed(0);
    pub const RED: Color = Color::Indexed(1);
    pub const GREEN: Color = Color::Indexed(2);
    pub const YELLOW: Color = Color::Indexed(3);
    pub const BLUE: Color = Color::Indexed(4);
    pub const MAGENTA: Color = Color::Indexed(5);
    pub const CYAN: Color = Color::Indexed(6);
    pub const WHITE: Color = Color::Indexed(7);

    fn to_crossterm(self) -> Option<AnsiColor> {
        match self {
            Color::Default => None,
            Color::Indexed(code) => Some(AnsiColor::AnsiValue(code)),
        }
    }
}

/// Color definition (RGB)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const BLACK: RgbColor = RgbColor::new(0, 0, 0);
    pub const RED: RgbColor = RgbColor::new(205, 0, 0);
    pub const GREEN: RgbColor = RgbColor::new(0, 205, 0);
    pub const YELLOW: RgbColor = RgbColor::new(205, 205, 0);
    pub const BLUE: RgbColor = RgbColor::new(0, 111, 184);
    pub const MAGENTA: RgbColor = RgbColor::new(205, 0, 205);
    pub const CYAN: RgbColor = RgbColor::new(0, 205, 205);
    pub const WHITE: RgbColor = RgbColor::new(229, 229, 229);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (leading `#` optional)
    pub fn parse_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

bitflags! {
    /// Font attributes, bit `n` maps to SGR parameter `n`
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct FontStyle: u16 {
        const NORMAL    = 1 << 0;
        const BOLD      = 1 << 1;
        const FAINT     = 1 << 2;
        const ITALIC    = 1 << 3;
        const UNDERLINE = 1 << 4;
        const BLINK     = 1 << 5;
        const INVERT    = 1 << 7;
        const HIDE      = 1 << 8;
        const STRIKE    = 1 << 9;
    }
}

const FONT_ATTRIBUTES: [(FontStyle, Attribute); 8] = [
    (FontStyle::BOLD, Attribute::Bold),
    (FontStyle::FAINT, Attribute::Dim),
    (FontStyle::ITALIC, Attribute::Italic),
    (FontStyle::UNDERLINE, Attribute::Underlined),
    (FontStyle::BLINK, Attribute::SlowBlink),
    (FontStyle::INVERT, Attribute::Reverse),
    (FontStyle::HIDE, Attribute::Hidden),
    (FontStyle::STRIKE, Attribute::CrossedOut),
];

/// Foreground, background and font attributes of a run of text.
///
/// The escape prefix is computed once on construction; two styles are equal
/// when they render the same prefix.
#[derive(Clone, Debug, Default)]
pub struct TextStyle {
    fg: Color,
    bg: Color,
    font: FontStyle,
    prefix: String,
}

impl TextStyle {
    pub fn new(fg: Color) -> Self {
        Self::build(fg, Color::Default, FontStyle::empty())
    }

    pub fn with_background(self, bg: Color) -> Self {
        Self::build(self.fg, bg, self.font)
    }

    pub fn with_font(self, font: FontStyle) -> Self {
        Self::build(self.fg, self.bg, font)
    }

    fn build(fg: Color, bg: Color, font: FontStyle) -> Self {
        let mut prefix = String::new();
        if let Some(color) = fg.to_crossterm() {
            prefix.push_str(&ansi(SetForegroundColor(color)));
        }
        if let Some(color) = bg.to_crossterm() {
            prefix.push_str(&ansi(SetBackgroundColor(color)));
        }
        for (flag, attribute) in FONT_ATTRIBUTES {
            if font.contains(flag) {
                prefix.push_str(&ansi(SetAttribute(attribute)));
            }
        }
        Self { fg, bg, font, prefix }
    }

    pub fn is_default(&self) -> bool {
        self.prefix.is_empty()
    }

    /// Escape prefix, empty for the default style
    pub fn as_str(&self) -> &str {
        &self.prefix
    }
}

impl PartialEq for TextStyle {
    fn eq(&self, other: &Self) -> bool {
        self.prefix == other.prefix
    }
}

impl Eq for TextStyle {}

/// Terminal cursor color
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CursorStyle {
    color: Option<RgbColor>,
}

impl CursorStyle {
    pub fn new(color: RgbColor) -> Self {
        Self { color: Some(color) }
    }

    /// OSC 12 to set the color, OSC 112 to restore the terminal default
    pub fn escape(&self) -> String {
        match self.color {
            Some(RgbColor { r, g, b }) => format!("\x1b]12;#{:02x}{:02x}{:02x}\x1b\\", r, g, b),
            None => "\x1b]112\x07".to_string(),
        }
    }
}

fn ansi(command: impl Command) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = command.write_ansi(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style_is_empty() {
        assert_eq!(TextStyle::default().as_str(), "");
        assert!(TextStyle::new(Color::Default).is_default());
    }

    #[test]
    fn test_color_escapes() {
        assert_eq!(TextStyle::new(Color::RED).as_str(), "\x1b[38;5;1m");
        assert_eq!(
            TextStyle::new(Color::GREEN).with_background(Color::Indexed(17)).as_str(),
            "\x1b[38;5;2m\x1b[48;5;17m"
        );
    }

    #[test]
    fn test_font_escapes() {
        let style = TextStyle::default().with_font(FontStyle::BOLD | FontStyle::UNDERLINE);
        assert_eq!(style.as_str(), "\x1b[1m\x1b[4m");

        let style = TextStyle::default().with_font(FontStyle::INVERT | FontStyle::STRIKE);
        assert_eq!(style.as_str(), "\x1b[7m\x1b[9m");
    }

    #[test]
    fn test_style_equality() {
        assert_eq!(TextStyle::new(Color::BLUE), TextStyle::new(Color::Indexed(4)));
        assert_ne!(TextStyle::new(Color::BLUE), TextStyle::default());
    }

    #[test]
    fn test_cursor_style() {
        assert_eq!(CursorStyle::new(RgbColor::RED).escape(), "\x1b]12;#cd0000\x1b\\");
        assert_eq!(CursorStyle::default().escape(), "\x1b]112\x07");
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(RgbColor::parse_hex("#006fb8"), Some(RgbColor::BLUE));
        assert_eq!(RgbColor::parse_hex("cd0000"), Some(RgbColor::RED));
        assert_eq!(RgbColor::parse_hex("#12345"), None);
        assert_eq!(RgbColor::parse_hex("#zz0000"), None);
    }
}
