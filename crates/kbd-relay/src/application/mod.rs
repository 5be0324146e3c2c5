//! Application layer for kbd-relay.
//!
//! The relay session lives here: it decides *what* happens for every
//! identifier change, key event and transport notification, and delegates
//! *how* bytes reach the device to a [`Connector`] and where synthetic
//! events go to a [`RelayObserver`].
//!
//! # What does NOT belong here?
//!
//! - Opening sockets or spawning tasks (that is infrastructure)
//! - Reading input lines or printing JSON (that is the driver)

pub mod observer;
pub mod relay_session;
pub mod transport;

pub use observer::{EventBuffer, Notification, RelayObserver};
pub use relay_session::RelaySession;
pub use transport::{Connection, Connector, TransportError, TransportEvent, TransportEventKind};
