//! Key event types flowing into and out of the relay session.
//!
//! ```text
//! inbound                              outbound
//! ───────                              ────────
//! PhysicalKeyEvent  ──► wire token  "dKeyA" (to the device)
//! VirtualClick      ──► SyntheticKeyEvent   (to in-page consumers)
//! ```
//!
//! [`OutboundEvent`] is the JSON shape the `kbd-relay` binary prints for
//! in-page consumers: one object per line, either a key event carrying the
//! DOM field names or the payload-free `kbd-closed` notification.

use serde::{Deserialize, Serialize};

use kbd_core::{Direction, KeyCode, KeyIdentity, ModifierFlags};

/// A key event produced by the real keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalKeyEvent {
    pub direction: Direction,
    /// DOM `key` value; carried for logging only, never sent.
    pub key: String,
    /// DOM `code` value; this is what goes on the wire.
    pub code: String,
}

impl PhysicalKeyEvent {
    pub fn new(direction: Direction, key: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            direction,
            key: key.into(),
            code: code.into(),
        }
    }
}

impl From<&SyntheticKeyEvent> for PhysicalKeyEvent {
    /// A synthetic event as a page-level key listener observes it.
    fn from(event: &SyntheticKeyEvent) -> Self {
        Self::new(event.direction, event.key.clone(), event.code.clone())
    }
}

/// A click on one of the on-screen key widgets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualClick {
    /// The widget's unshifted key value (`"a"`, `"1"`, `"Shift"`).
    pub key: String,
    pub code: String,
    /// Whether the widget is a toggling modifier.
    pub is_modifier: bool,
}

impl VirtualClick {
    pub fn new(key: impl Into<String>, code: impl Into<String>, is_modifier: bool) -> Self {
        Self {
            key: key.into(),
            code: code.into(),
            is_modifier,
        }
    }

    /// The click a rendered widget for `code` produces.
    pub fn for_widget(code: KeyCode) -> Self {
        let KeyIdentity { code: c, key } = KeyIdentity::for_widget(code, false);
        Self::new(key, c, code.is_modifier())
    }
}

/// A key event the session emits on behalf of the on-screen keyboard.
///
/// Serializes as a DOM-style `KeyboardEvent` init object:
///
/// ```json
/// {"type":"keydown","key":"A","code":"KeyA","ctrlKey":false,"shiftKey":true,"altKey":false,"metaKey":false}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticKeyEvent {
    #[serde(rename = "type")]
    pub direction: Direction,
    pub key: String,
    pub code: String,
    #[serde(flatten)]
    pub modifiers: ModifierFlags,
}

/// What happened to a physical key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Sent to the device; the platform's default handling must be suppressed.
    Forwarded,
    /// No live connection; the event is left alone.
    Dropped,
}

impl Disposition {
    /// Whether the caller should suppress the event's default action.
    pub fn suppresses_default(self) -> bool {
        matches!(self, Disposition::Forwarded)
    }
}

/// One line of output for in-page consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OutboundEvent {
    Key(SyntheticKeyEvent),
    Closed(ClosedNotice),
}

/// The payload-free "session closed" notification: `{"type":"kbd-closed"}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "kbd-closed")]
pub struct ClosedNotice {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_event_uses_dom_field_names() {
        // Arrange
        let event = SyntheticKeyEvent {
            direction: Direction::Down,
            key: "A".to_string(),
            code: "KeyA".to_string(),
            modifiers: ModifierFlags {
                shift_key: true,
                ..ModifierFlags::default()
            },
        };

        // Act
        let value = serde_json::to_value(&event).unwrap();

        // Assert
        assert_eq!(
            value,
            serde_json::json!({
                "type": "keydown",
                "key": "A",
                "code": "KeyA",
                "ctrlKey": false,
                "shiftKey": true,
                "altKey": false,
                "metaKey": false
            })
        );
    }

    #[test]
    fn test_closed_notice_serializes_as_kbd_closed() {
        let json = serde_json::to_string(&OutboundEvent::Closed(ClosedNotice {})).unwrap();
        assert_eq!(json, r#"{"type":"kbd-closed"}"#);
    }

    #[test]
    fn test_widget_click_for_modifier() {
        let click = VirtualClick::for_widget(KeyCode::AltRight);
        assert_eq!(click, VirtualClick::new("Alt", "AltRight", true));
    }

    #[test]
    fn test_widget_click_for_letter() {
        let click = VirtualClick::for_widget(KeyCode::KeyQ);
        assert_eq!(click, VirtualClick::new("q", "KeyQ", false));
    }

    #[test]
    fn test_only_forwarded_suppresses_default() {
        assert!(Disposition::Forwarded.suppresses_default());
        assert!(!Disposition::Dropped.suppresses_default());
    }
}
