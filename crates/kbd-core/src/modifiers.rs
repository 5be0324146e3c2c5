//! Modifier tracker: live pressed/released state of the eight modifier keys.
//!
//! The tracker is the single source of truth for "is Shift held?".  The
//! rendered modifier widgets write into it whenever their `pressed` state
//! changes, and the relay session reads it to decide shift casing and to fill
//! in the `ctrlKey`/`shiftKey`/`altKey`/`metaKey` flags of emitted events.
//!
//! Codes outside the modifier set are not errors: [`ModifierTracker::is_pressed`]
//! answers `false` for them and [`ModifierTracker::set_pressed`] ignores them.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::catalog::{KeyCode, KeyIdentity};

/// One of the eight tracked modifier keys.
///
/// The declaration order is the order in which
/// [`ModifierTracker::release_all`] reports released keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modifier {
    ShiftLeft,
    ShiftRight,
    ControlLeft,
    ControlRight,
    AltLeft,
    AltRight,
    MetaLeft,
    MetaRight,
}

impl Modifier {
    /// All modifiers in release order.
    pub const ALL: [Modifier; 8] = [
        Modifier::ShiftLeft,
        Modifier::ShiftRight,
        Modifier::ControlLeft,
        Modifier::ControlRight,
        Modifier::AltLeft,
        Modifier::AltRight,
        Modifier::MetaLeft,
        Modifier::MetaRight,
    ];

    /// Parses a DOM `code` string; `None` for anything that is not a modifier.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.code() == code)
    }

    /// Returns the DOM `code` string (`"ShiftLeft"`).
    pub fn code(self) -> &'static str {
        self.key_code().as_str()
    }

    /// Returns the DOM `key` name both sides share (`"Shift"`).
    pub fn key(self) -> &'static str {
        self.key_code().default_key()
    }

    /// Returns the catalog entry for this modifier.
    pub fn key_code(self) -> KeyCode {
        match self {
            Modifier::ShiftLeft => KeyCode::ShiftLeft,
            Modifier::ShiftRight => KeyCode::ShiftRight,
            Modifier::ControlLeft => KeyCode::ControlLeft,
            Modifier::ControlRight => KeyCode::ControlRight,
            Modifier::AltLeft => KeyCode::AltLeft,
            Modifier::AltRight => KeyCode::AltRight,
            Modifier::MetaLeft => KeyCode::MetaLeft,
            Modifier::MetaRight => KeyCode::MetaRight,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// The four boolean modifier flags carried by every emitted key event.
///
/// Each flag is `true` iff either the left or the right variant is held.
/// Serializes with the DOM field names (`ctrlKey`, `shiftKey`, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifierFlags {
    pub ctrl_key: bool,
    pub shift_key: bool,
    pub alt_key: bool,
    pub meta_key: bool,
}

/// Pressed state of every modifier key.
#[derive(Debug, Clone, Default)]
pub struct ModifierTracker {
    pressed: [bool; 8],
}

impl ModifierTracker {
    /// Creates a tracker with every modifier released.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` iff `code` is a modifier and is currently held.
    pub fn is_pressed(&self, code: &str) -> bool {
        Modifier::from_code(code).is_some_and(|m| self.is_held(m))
    }

    /// Returns `true` if `modifier` is currently held.
    pub fn is_held(&self, modifier: Modifier) -> bool {
        self.pressed[modifier.index()]
    }

    /// Records the pressed state of `code`; a no-op for non-modifier codes.
    pub fn set_pressed(&mut self, code: &str, pressed: bool) {
        match Modifier::from_code(code) {
            Some(m) => {
                trace!("modifier {code} pressed={pressed}");
                self.pressed[m.index()] = pressed;
            }
            None => trace!("ignoring pressed state for non-modifier code {code:?}"),
        }
    }

    /// Releases every held modifier and returns the keys that were released.
    ///
    /// The result lists keys in [`Modifier::ALL`] order so callers can emit a
    /// synthetic key-up for each.  After the call every modifier is released;
    /// taking `&mut self` guarantees no key is missed or released twice.
    pub fn release_all(&mut self) -> Vec<KeyIdentity> {
        let mut released = Vec::new();
        for m in Modifier::ALL {
            if std::mem::take(&mut self.pressed[m.index()]) {
                released.push(KeyIdentity::new(m.code(), m.key()));
            }
        }
        released
    }

    /// Returns the four event flags for the current state.
    pub fn flags(&self) -> ModifierFlags {
        let either = |l: Modifier, r: Modifier| self.is_held(l) || self.is_held(r);
        ModifierFlags {
            ctrl_key: either(Modifier::ControlLeft, Modifier::ControlRight),
            shift_key: either(Modifier::ShiftLeft, Modifier::ShiftRight),
            alt_key: either(Modifier::AltLeft, Modifier::AltRight),
            meta_key: either(Modifier::MetaLeft, Modifier::MetaRight),
        }
    }

    /// Returns `true` when a clicked key should be shift-cased.
    ///
    /// Shift must be held on at least one side and none of Control, Alt or
    /// Meta may be held on either side, so chorded shortcuts such as
    /// Ctrl+Shift+A keep their lowercase key.
    pub fn shift_casing_applies(&self) -> bool {
        let flags = self.flags();
        flags.shift_key && !(flags.ctrl_key || flags.alt_key || flags.meta_key)
    }

    /// Returns `true` if any modifier is held.
    pub fn any_pressed(&self) -> bool {
        self.pressed.iter().any(|p| *p)
    }
}
