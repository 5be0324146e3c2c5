//! WebSocket transport built on `tokio-tungstenite`.
//!
//! Each call to [`WsConnector::connect`] spawns one Tokio task that owns the
//! socket for its whole life:
//!
//! ```text
//!            commands (Frame / Close)
//! WsConnection ─────────────────────────► connection task ◄──► device
//!                                              │
//!     driver loop ◄────── TransportEvent ──────┘
//!                  (Opened, Message, Error, Closed; tagged with generation)
//! ```
//!
//! All connections report into the same event queue, so the driver loop
//! sees every notification in arrival order and hands it to the session on
//! one thread.
//!
//! Closing works in every phase.  A close (or a dropped handle) that arrives
//! while the handshake is still running abandons it, so a superseded
//! connection never opens on the device.
//!
//! Only `ws://` is supported out of the box: the TLS features of
//! `tokio-tungstenite` are not enabled, so a `wss://` target fails during
//! the handshake and is reported as an `Error` event.
//!
//! No keep-alive pings are sent.

use futures_util::{SinkExt, StreamExt};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};
use tracing::{debug, info, warn};

use crate::application::transport::{Connection, Connector, TransportError, TransportEvent};
use crate::domain::Generation;

/// What a [`WsConnection`] asks its task to do.
#[derive(Debug)]
enum Command {
    Frame(String),
    Close,
}

/// Dials devices over WebSocket.
#[derive(Debug, Clone)]
pub struct WsConnector {
    events: UnboundedSender<TransportEvent>,
}

impl WsConnector {
    /// Creates a connector reporting into `events`.
    pub fn new(events: UnboundedSender<TransportEvent>) -> Self {
        Self { events }
    }

    /// Creates a connector together with the receiving end of its queue.
    pub fn channel() -> (Self, UnboundedReceiver<TransportEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl Connector for WsConnector {
    type Connection = WsConnection;

    /// Spawns the connection task on the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Connect`] when called outside a runtime.
    fn connect(
        &mut self,
        target: &str,
        generation: Generation,
    ) -> Result<WsConnection, TransportError> {
        let runtime = Handle::try_current().map_err(|e| TransportError::Connect {
            target: target.to_string(),
            reason: e.to_string(),
        })?;

        let (commands, command_rx) = mpsc::unbounded_channel();
        runtime.spawn(run_connection(
            target.to_string(),
            generation,
            command_rx,
            self.events.clone(),
        ));
        Ok(WsConnection { commands })
    }
}

/// Handle to one spawned connection task.
///
/// Dropping the handle closes the connection, also while its handshake is
/// still in flight.
#[derive(Debug)]
pub struct WsConnection {
    commands: UnboundedSender<Command>,
}

impl Connection for WsConnection {
    fn send(&mut self, frame: String) -> Result<(), TransportError> {
        self.commands
            .send(Command::Frame(frame))
            .map_err(|_| TransportError::ConnectionGone)
    }

    fn close(&mut self) {
        // The task may already have exited; then there is nothing to close.
        let _ = self.commands.send(Command::Close);
    }
}

// ── Connection task ───────────────────────────────────────────────────────────

fn report(events: &UnboundedSender<TransportEvent>, event: TransportEvent) {
    if events.send(event).is_err() {
        debug!("event queue closed; dropping transport event");
    }
}

/// Owns one WebSocket from handshake to teardown.
///
/// Always finishes by reporting `Closed`, whatever ended the connection.
/// A close requested while the handshake is still running abandons the
/// handshake: the socket is dropped and `Opened` is never reported.
async fn run_connection(
    target: String,
    generation: Generation,
    mut commands: UnboundedReceiver<Command>,
    events: UnboundedSender<TransportEvent>,
) {
    let handshake = connect_async(target.as_str());
    tokio::pin!(handshake);

    let ws = loop {
        tokio::select! {
            biased;

            command = commands.recv() => match command {
                Some(Command::Frame(_)) => {
                    debug!("connection {generation}: dropping frame sent before open");
                }
                Some(Command::Close) | None => {
                    info!("connection {generation}: closed during handshake with {target}");
                    report(&events, TransportEvent::closed(generation));
                    return;
                }
            },
            result = &mut handshake => match result {
                Ok((ws, _response)) => break ws,
                Err(e) => {
                    warn!("connection {generation}: handshake with {target} failed: {e}");
                    report(&events, TransportEvent::error(generation, e.to_string()));
                    report(&events, TransportEvent::closed(generation));
                    return;
                }
            },
        }
    };

    info!("connection {generation}: connected to {target}");
    report(&events, TransportEvent::opened(generation));

    let (mut sink, mut stream) = ws.split();
    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Frame(text)) => {
                    if let Err(e) = sink.send(WsMessage::Text(text)).await {
                        warn!("connection {generation}: send failed: {e}");
                        report(&events, TransportEvent::error(generation, e.to_string()));
                        break;
                    }
                }
                Some(Command::Close) | None => {
                    debug!("connection {generation}: closing");
                    if let Err(e) = sink.close().await {
                        debug!("connection {generation}: close handshake failed: {e}");
                    }
                    break;
                }
            },
            incoming = stream.next() => match incoming {
                Some(Ok(WsMessage::Text(text))) => {
                    report(&events, TransportEvent::message(generation, text));
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    debug!("connection {generation}: remote close {frame:?}");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("connection {generation}: read failed: {e}");
                    report(&events, TransportEvent::error(generation, e.to_string()));
                    break;
                }
                None => break,
            },
        }
    }

    report(&events, TransportEvent::closed(generation));
}
