//! Key model
//!
//! Decodes the raw bytes captured from one terminal read into a [`Key`].
//!
//! A single byte becomes a code-unit key, anything longer becomes an opaque
//! sequence key compared by exact byte content. Unknown sequences are not an
//! error; they simply never match a named key.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

/// Escape byte
pub const ESC: u8 = 0x1B;

/// Caret marker accepted in place of a leading escape byte (`"^[A"`)
const CARET: u8 = b'^';

/// A decoded keyboard event
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Wildcard bucket for listener registration, never produced by decoding
    Any,
    /// A single control or printable code unit
    Code(u8),
    /// A multi-byte sequence, escape sequences normalized to start with ESC
    Sequence(Cow<'static, [u8]>),
}

impl Key {
    pub const TAB: Key = Key::Code(9);
    pub const ENTER: Key = Key::Code(13);
    pub const ESC: Key = Key::Code(ESC);
    pub const BACKSPACE: Key = Key::Code(127);

    pub const ARROW_UP: Key = Key::Sequence(Cow::Borrowed(b"\x1b[A"));
    pub const ARROW_DOWN: Key = Key::Sequence(Cow::Borrowed(b"\x1b[B"));
    pub const ARROW_RIGHT: Key = Key::Sequence(Cow::Borrowed(b"\x1b[C"));
    pub const ARROW_LEFT: Key = Key::Sequence(Cow::Borrowed(b"\x1b[D"));
    pub const HOME: Key = Key::Sequence(Cow::Borrowed(b"\x1b[H"));
    pub const END: Key = Key::Sequence(Cow::Borrowed(b"\x1b[F"));

    // SS3 encoding, as sent by most terminals for the first four function keys
    pub const F1: Key = Key::Sequence(Cow::Borrowed(b"\x1bOP"));
    pub const F2: Key = Key::Sequence(Cow::Borrowed(b"\x1bOQ"));
    pub const F3: Key = Key::Sequence(Cow::Borrowed(b"\x1bOR"));
    pub const F4: Key = Key::Sequence(Cow::Borrowed(b"\x1bOS"));

    /// Ctrl + lowercase letter, `c - 'a' + 1`
    pub const fn ctrl(c: char) -> Key {
        Key::Code((c as u8).wrapping_sub(b'a').wrapping_add(1))
    }

    /// Build a sequence key, replacing a leading caret marker with ESC
    pub fn sequence(bytes: impl Into<Vec<u8>>) -> Key {
        let mut bytes = bytes.into();
        if bytes.first() == Some(&CARET) {
            bytes[0] = ESC;
        }
        Key::Sequence(Cow::Owned(bytes))
    }

    /// Decode the bytes captured by one terminal read.
    ///
    /// An empty read means end of input and decodes to Ctrl-D.
    pub fn from_bytes(bytes: &[u8]) -> Key {
        match bytes {
            [] => Key::ctrl('d'),
            [code] => Key::Code(*code),
            _ => Key::sequence(bytes),
        }
    }

    /// Code unit of a non-special key
    pub fn code(&self) -> Option<u8> {
        match self {
            Key::Code(code) => Some(*code),
            _ => None,
        }
    }

    /// Raw bytes of a sequence key
    pub fn sequence_bytes(&self) -> Option<&[u8]> {
        match self {
            Key::Sequence(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn is_special(&self) -> bool {
        matches!(self, Key::Sequence(_))
    }

    /// True for code-unit keys holding a printable ASCII character
    pub fn is_printable(&self) -> bool {
        matches!(self, Key::Code(code) if is_print(*code))
    }

    /// The character to insert for a printable key
    pub fn as_char(&self) -> Option<char> {
        match self {
            Key::Code(code) if is_print(*code) => Some(*code as char),
            _ => None,
        }
    }

    /// Canonical string form used for ordering.
    ///
    /// Code units render as their decimal value, sequences as their raw bytes.
    pub fn canonical(&self) -> Cow<'_, [u8]> {
        match self {
            Key::Any => Cow::Borrowed(b"-1"),
            Key::Code(code) => Cow::Owned(code.to_string().into_bytes()),
            Key::Sequence(bytes) => Cow::Borrowed(bytes),
        }
    }

    /// Human readable form, e.g. `<Key code="a">` or `<Key sequence="^[A">`
    pub fn describe(&self) -> String {
        match self {
            Key::Any => "<Key any>".to_string(),
            Key::Code(code) => format!("<Key code=\"{}\">", escape_byte(*code)),
            Key::Sequence(bytes) => {
                let seq: String = bytes.iter().map(|b| escape_byte(*b)).collect();
                format!("<Key sequence=\"{}\">", seq)
            }
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Key::Any => 0,
            Key::Code(_) => 1,
            Key::Sequence(_) => 2,
        }
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical()
            .cmp(&other.canonical())
            .then_with(|| self.rank().cmp(&other.rank()))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.canonical()))
    }
}

fn is_print(code: u8) -> bool {
    (0x20..0x7F).contains(&code)
}

fn escape_byte(byte: u8) -> String {
    if is_print(byte) {
        (byte as char).to_string()
    } else if byte == ESC {
        "^".to_string()
    } else {
        format!("\\{}", byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ctrl_keys() {
        assert_eq!(Key::ctrl('a'), Key::Code(1));
        assert_eq!(Key::ctrl('c'), Key::Code(3));
        assert_eq!(Key::ctrl('d'), Key::Code(4));
        assert!(!Key::ctrl('c').is_printable());
    }

    #[test]
    fn test_decode_bytes() {
        assert_eq!(Key::from_bytes(b"a"), Key::Code(b'a'));
        assert_eq!(Key::from_bytes(b"\r"), Key::ENTER);
        assert_eq!(Key::from_bytes(b"\x1b[A"), Key::ARROW_UP);
        assert_eq!(Key::from_bytes(b"\x1bOS"), Key::F4);
        assert_eq!(Key::from_bytes(b""), Key::ctrl('d'));

        // Unknown sequences stay opaque
        let key = Key::from_bytes(b"\x1b[15~");
        assert!(key.is_special());
        assert_eq!(key.sequence_bytes(), Some(&b"\x1b[15~"[..]));
    }

    #[test]
    fn test_caret_normalization() {
        assert_eq!(Key::sequence("^[C"), Key::ARROW_RIGHT);
        assert_eq!(Key::sequence("^OP"), Key::F1);
        assert_eq!(Key::sequence("x^y").sequence_bytes(), Some(&b"x^y"[..]));
    }

    #[test]
    fn test_printable() {
        assert!(Key::Code(b'a').is_printable());
        assert!(Key::Code(b' ').is_printable());
        assert!(Key::Code(b'~').is_printable());
        assert!(!Key::TAB.is_printable());
        assert!(!Key::BACKSPACE.is_printable());
        assert!(!Key::ARROW_LEFT.is_printable());
        assert!(!Key::Any.is_printable());
        assert_eq!(Key::Code(b'z').as_char(), Some('z'));
        assert_eq!(Key::ENTER.as_char(), None);
    }

    #[test]
    fn test_canonical_form() {
        assert_eq!(Key::ENTER.to_string(), "13");
        assert_eq!(Key::Any.to_string(), "-1");
        assert_eq!(Key::ARROW_RIGHT.to_string(), "\x1b[C");
        assert!(Key::Code(1) < Key::Code(9));
        assert!(Key::Any < Key::TAB);
    }

    #[test]
    fn test_describe() {
        assert_eq!(Key::Code(b'a').describe(), "<Key code=\"a\">");
        assert_eq!(Key::TAB.describe(), "<Key code=\"\\9\">");
        assert_eq!(Key::ARROW_UP.describe(), "<Key sequence=\"^[A\">");
    }
}
