//! Session lifecycle vocabulary.
//!
//! ```text
//!            id set                 opened
//!   Idle ───────────► Connecting ───────────► Open
//!    ▲                    │                    │
//!    │ id cleared         │ error / closed     │ error / closed
//!    │                    ▼                    ▼
//!    └──────────────── Closed ◄────────────────┘
//!                         │  id set
//!                         └──────► Connecting
//! ```
//!
//! Changing the identifier from any state first tears down the current
//! connection (if any), then dials again when the new identifier is
//! non-empty.

use std::fmt;

/// Where the session is in its connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No identifier selected, nothing dialed.
    Idle,
    /// Dialed; waiting for the transport to report the connection open.
    Connecting,
    /// Connected; physical keys are forwarded.
    Open,
    /// The connection ended on its own (remote close or transport error).
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Idle => "idle",
            SessionState::Connecting => "connecting",
            SessionState::Open => "open",
            SessionState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Why a connection ended.
///
/// Observers always receive one, but the outward notification carries no
/// payload; the reason is for logs and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The device closed the connection.
    RemoteClosed,
    /// The transport failed: connect error, send error or an error event.
    TransportError,
    /// A new identifier replaced the connection.
    Superseded,
    /// The identifier was cleared.
    Cleared,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CloseReason::RemoteClosed => "closed by remote",
            CloseReason::TransportError => "transport error",
            CloseReason::Superseded => "superseded by a new identifier",
            CloseReason::Cleared => "identifier cleared",
        };
        f.write_str(s)
    }
}
