//! Connection generations.
//!
//! # Why generations? (for beginners)
//!
//! Every time the session dials the device it gets a new connection, and
//! the old one may still be winding down.  Its "closed" or "error"
//! notification can arrive *after* the replacement is already live.  If the
//! session acted on it, a healthy new connection would be torn down by the
//! death of the old one.
//!
//! Each connection attempt is therefore stamped with a [`Generation`], and
//! every transport notification carries the generation of the connection it
//! came from.  The session only acts on notifications whose generation
//! matches the connection it currently holds; everything else is stale.

use std::fmt;

/// Identity of one connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    /// Returns the raw counter value.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out strictly increasing generations, starting at 1.
///
/// The session is single-threaded, so a plain integer suffices; `&mut self`
/// keeps two attempts from ever sharing a value.
#[derive(Debug, Default)]
pub struct GenerationCounter {
    last: u64,
}

impl GenerationCounter {
    /// Creates a counter whose first generation is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a generation never returned before by this counter.
    ///
    /// Wraps around at `u64::MAX` without panicking.
    pub fn next(&mut self) -> Generation {
        self.last = self.last.wrapping_add(1);
        Generation(self.last)
    }
}
