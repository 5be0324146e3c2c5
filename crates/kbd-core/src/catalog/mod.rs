//! Key catalog: the keys the on-screen keyboard renders and the shift table.
//!
//! The catalog is pure data.  The one piece of behaviour it owns is
//! [`shifted_value`], which answers "what does this key produce while Shift
//! is held?" for the US layout the on-screen keyboard draws.

pub mod code;

use serde::{Deserialize, Serialize};

pub use code::KeyCode;

/// Identifies a key by its physical `code` and the `key` value it emits.
///
/// `code` is stable across layouts (`"KeyA"`); `key` is the printable or
/// semantic label placed in emitted events (`"a"`, `"A"`, `"Shift"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyIdentity {
    /// DOM `KeyboardEvent.code` string.
    pub code: String,
    /// DOM `KeyboardEvent.key` string.
    pub key: String,
}

impl KeyIdentity {
    /// Creates an identity from any string-like code and key.
    pub fn new(code: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            key: key.into(),
        }
    }

    /// Returns the identity a rendered widget for `code` carries.
    ///
    /// With `use_code` set the widget reports its code string as the key
    /// label too (the arrow keys do this so they emit `"ArrowUp"` rather
    /// than `"Up"`).
    pub fn for_widget(code: KeyCode, use_code: bool) -> Self {
        let key = if use_code { code.as_str() } else { code.default_key() };
        Self::new(code.as_str(), key)
    }
}

/// Punctuation and digit keys and the character they produce with Shift held.
const SHIFT_TABLE: &[(&str, &str)] = &[
    ("`", "~"),
    ("1", "!"),
    ("2", "@"),
    ("3", "#"),
    ("4", "$"),
    ("5", "%"),
    ("6", "^"),
    ("7", "&"),
    ("8", "*"),
    ("9", "("),
    ("0", ")"),
    ("-", "_"),
    ("=", "+"),
    ("[", "{"),
    ("]", "}"),
    ("\\", "|"),
    (";", ":"),
    ("'", "\""),
    (",", "<"),
    (".", ">"),
    ("/", "?"),
];

/// Returns the value `key` takes while Shift is held.
///
/// - A single lowercase ASCII letter is uppercased.
/// - A punctuation or digit character is looked up in the shift table.
/// - Anything else (already-uppercase letters, named keys such as `"F1"`)
///   is returned unchanged.
///
/// # Example
///
/// ```rust
/// use kbd_core::shifted_value;
///
/// assert_eq!(shifted_value("a"), "A");
/// assert_eq!(shifted_value("1"), "!");
/// assert_eq!(shifted_value("F1"), "F1");
/// ```
pub fn shifted_value(key: &str) -> String {
    let mut chars = key.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_lowercase() {
            return c.to_ascii_uppercase().to_string();
        }
    }

    SHIFT_TABLE
        .iter()
        .find(|(plain, _)| *plain == key)
        .map_or_else(|| key.to_string(), |(_, shifted)| (*shifted).to_string())
}
