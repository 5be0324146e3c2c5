//! Transport seam: how the session reaches the device.
//!
//! The session never touches a socket.  It asks a [`Connector`] to dial a
//! URL and gets back a [`Connection`] it can push text frames into.  The
//! transport reports what happens next (opened, closed, errored, message
//! received) as [`TransportEvent`]s tagged with the [`Generation`] the
//! session handed to `connect`; the session's owner feeds those back in.
//!
//! Connecting is not awaited.  `connect` only *starts* the attempt, so a
//! successful return means "dialing", and the outcome arrives later as an
//! `Opened` or `Error` event.  This keeps the session a plain synchronous
//! state machine that can be unit-tested with a recording double.

use thiserror::Error;

use crate::domain::Generation;

/// Errors a transport can report synchronously.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The attempt could not even be started.
    #[error("cannot connect to {target}: {reason}")]
    Connect { target: String, reason: String },

    /// The connection's I/O task is gone; nothing can be sent any more.
    #[error("connection is no longer running")]
    ConnectionGone,

    /// The frame could not be handed to the transport.
    #[error("send failed: {0}")]
    Send(String),
}

/// One live (or dialing) connection.
pub trait Connection {
    /// Queues one text frame for delivery.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the frame cannot be queued; the session
    /// treats this like a transport error event.
    fn send(&mut self, frame: String) -> Result<(), TransportError>;

    /// Asks the transport to close the connection.  Idempotent.
    fn close(&mut self);
}

/// Starts connection attempts.
pub trait Connector {
    type Connection: Connection;

    /// Begins dialing `target`.  Every event for this attempt is tagged with
    /// `generation`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Connect`] if the attempt cannot be started
    /// at all.
    fn connect(
        &mut self,
        target: &str,
        generation: Generation,
    ) -> Result<Self::Connection, TransportError>;
}

/// What a connection reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEventKind {
    Opened,
    /// A text frame from the device.  The relay does not act on these.
    Message(String),
    Error(String),
    Closed,
}

/// A transport notification, tagged with the connection it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportEvent {
    pub generation: Generation,
    pub kind: TransportEventKind,
}

impl TransportEvent {
    pub fn opened(generation: Generation) -> Self {
        Self {
            generation,
            kind: TransportEventKind::Opened,
        }
    }

    pub fn message(generation: Generation, text: impl Into<String>) -> Self {
        Self {
            generation,
            kind: TransportEventKind::Message(text.into()),
        }
    }

    pub fn error(generation: Generation, detail: impl Into<String>) -> Self {
        Self {
            generation,
            kind: TransportEventKind::Error(detail.into()),
        }
    }

    pub fn closed(generation: Generation) -> Self {
        Self {
            generation,
            kind: TransportEventKind::Closed,
        }
    }
}
