//! # kbd-core
//!
//! Shared library for the ESP virtual keyboard relay containing the key
//! catalog, the modifier tracker, and the wire token codec.
//!
//! It has zero dependencies on OS APIs, UI frameworks, async runtimes, or
//! network sockets.
//!
//! # Architecture overview (for beginners)
//!
//! The relay renders an on-screen keyboard and forwards key activity to a
//! remote device (an ESP board acting as a USB keyboard) over a WebSocket.
//! This crate is the shared foundation.  It defines:
//!
//! - **`catalog`** – The static list of physical keys the on-screen keyboard
//!   offers, their key-cap labels, and the table that maps an unshifted
//!   character to its shifted form (`1` → `!`).
//!
//! - **`modifiers`** – The live pressed/released state of the eight modifier
//!   keys (Shift, Control, Alt, Meta; left and right).
//!
//! - **`protocol`** – How key activity travels over the wire.  Every event is
//!   a tiny text frame: one direction character followed by the key code,
//!   e.g. `dKeyA` or `uShiftLeft`.

pub mod catalog;
pub mod modifiers;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `kbd_core::KeyCode` instead of `kbd_core::catalog::code::KeyCode`.
pub use catalog::{shifted_value, KeyCode, KeyIdentity};
pub use modifiers::{Modifier, ModifierFlags, ModifierTracker};
pub use protocol::wire::{decode_token, encode_token, Direction, WireError, WireToken};
