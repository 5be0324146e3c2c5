//! Domain layer for kbd-relay.
//!
//! Pure types with no I/O, no async and no transport: configuration, the
//! key events the session consumes and produces, connection generations and
//! the lifecycle vocabulary.
//!
//! # What does NOT belong here?
//!
//! - Any `tokio` or WebSocket types
//! - Reading files or environment variables
//! - The session state machine itself (that is the application layer)

pub mod config;
pub mod events;
pub mod generation;
pub mod session;

pub use config::{RelayConfig, Scheme, UnknownScheme};
pub use events::{
    ClosedNotice, Disposition, OutboundEvent, PhysicalKeyEvent, SyntheticKeyEvent, VirtualClick,
};
pub use generation::{Generation, GenerationCounter};
pub use session::{CloseReason, SessionState};
