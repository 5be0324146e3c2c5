//! Text codec for the client → device key stream.
//!
//! Wire format (one WebSocket text frame per event):
//! ```text
//! [direction:1][code:N]
//! ```
//! `direction` is `d` for key-down and `u` for key-up; `code` is the DOM
//! `KeyboardEvent.code` string, verbatim.  There is no delimiter and no length
//! prefix: the transport's message boundaries frame each token, and the
//! receiver splits off the first character.
//!
//! ```text
//! dKeyA        KeyA pressed
//! uShiftLeft   left Shift released
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while decoding a wire token.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    /// The frame contained no characters at all.
    #[error("empty frame")]
    Empty,

    /// The first character is not a known direction marker.
    #[error("unknown direction marker: {0:?}")]
    UnknownDirection(char),

    /// The direction marker was not followed by a key code.
    #[error("missing key code after direction marker")]
    MissingCode,

    /// The DOM event type is neither `keydown` nor `keyup`.
    #[error("unsupported event type: {0:?}")]
    UnsupportedEventType(String),
}

/// Whether a key went down or came up.
///
/// Serializes as the DOM event type name (`"keydown"` / `"keyup"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "keydown")]
    Down,
    #[serde(rename = "keyup")]
    Up,
}

impl Direction {
    /// Returns the one-character wire marker.
    pub fn marker(self) -> char {
        match self {
            Direction::Down => 'd',
            Direction::Up => 'u',
        }
    }

    /// Parses a wire marker.
    pub fn from_marker(marker: char) -> Option<Self> {
        match marker {
            'd' => Some(Direction::Down),
            'u' => Some(Direction::Up),
            _ => None,
        }
    }

    /// Maps a DOM event type name to a direction.
    ///
    /// Only the two literal names are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnsupportedEventType`] for anything else
    /// (`"keypress"`, `"KeyDown"`, ...).
    pub fn from_event_type(event_type: &str) -> Result<Self, WireError> {
        match event_type {
            "keydown" => Ok(Direction::Down),
            "keyup" => Ok(Direction::Up),
            other => Err(WireError::UnsupportedEventType(other.to_string())),
        }
    }

    /// Returns the DOM event type name.
    pub fn event_type(self) -> &'static str {
        match self {
            Direction::Down => "keydown",
            Direction::Up => "keyup",
        }
    }
}

/// A decoded wire token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireToken {
    pub direction: Direction,
    pub code: String,
}

/// Encodes a key event as a wire token.
///
/// # Examples
///
/// ```rust
/// use kbd_core::protocol::{encode_token, Direction};
///
/// assert_eq!(encode_token(Direction::Down, "KeyB"), "dKeyB");
/// assert_eq!(encode_token(Direction::Up, "ShiftLeft"), "uShiftLeft");
/// ```
pub fn encode_token(direction: Direction, code: &str) -> String {
    let mut token = String::with_capacity(1 + code.len());
    token.push(direction.marker());
    token.push_str(code);
    token
}

/// Decodes one wire token.
///
/// # Errors
///
/// Returns [`WireError`] if the frame is empty, starts with an unknown
/// marker, or carries no code.
pub fn decode_token(frame: &str) -> Result<WireToken, WireError> {
    let mut chars = frame.chars();
    let marker = chars.next().ok_or(WireError::Empty)?;
    let direction = Direction::from_marker(marker).ok_or(WireError::UnknownDirection(marker))?;
    let code = chars.as_str();
    if code.is_empty() {
        return Err(WireError::MissingCode);
    }
    Ok(WireToken {
        direction,
        code: code.to_string(),
    })
}
