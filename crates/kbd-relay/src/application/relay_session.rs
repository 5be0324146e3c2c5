//! The relay session: one keyboard identifier, at most one device connection.
//!
//! The session sits between three event sources and two sinks:
//!
//! ```text
//!  identifier changes ─┐                 ┌─► Connection  (wire tokens "dKeyA")
//!  physical keys ──────┼─► RelaySession ─┤
//!  widget clicks ──────┤                 └─► RelayObserver (synthetic events,
//!  transport events ───┘                                    "session closed")
//! ```
//!
//! # Event model
//!
//! Every method runs to completion before the next event is handled; the
//! session is never shared between threads.  Transport callbacks are plain
//! method calls carrying the [`Generation`] of the connection they belong
//! to, and callbacks from any connection other than the current one are
//! ignored.
//!
//! # Physical versus virtual keys
//!
//! Physical key events are forwarded to the device verbatim (code only, no
//! casing, no modifier bookkeeping) and only while the connection is open.
//! Widget clicks never touch the wire: they are normalized (shift casing,
//! chord completion) and handed to the observer as synthetic events.

use tracing::{debug, info, trace, warn};

use kbd_core::{encode_token, shifted_value, Direction, ModifierTracker};

use crate::application::observer::RelayObserver;
use crate::application::transport::{
    Connection, Connector, TransportEvent, TransportEventKind,
};
use crate::domain::{
    CloseReason, Disposition, Generation, GenerationCounter, PhysicalKeyEvent, RelayConfig,
    SessionState, SyntheticKeyEvent, VirtualClick,
};

/// The connection the session currently holds.
struct Link<T> {
    generation: Generation,
    connection: T,
}

/// Relays key activity for one selected keyboard.
pub struct RelaySession<C: Connector, O: RelayObserver> {
    config: RelayConfig,
    connector: C,
    observer: O,
    modifiers: ModifierTracker,
    keyboard_id: String,
    state: SessionState,
    link: Option<Link<C::Connection>>,
    generations: GenerationCounter,
    last_close_reason: Option<CloseReason>,
}

impl<C: Connector, O: RelayObserver> RelaySession<C, O> {
    /// Creates an idle session with every modifier released.
    pub fn new(config: RelayConfig, connector: C, observer: O) -> Self {
        Self {
            config,
            connector,
            observer,
            modifiers: ModifierTracker::new(),
            keyboard_id: String::new(),
            state: SessionState::Idle,
            link: None,
            generations: GenerationCounter::new(),
            last_close_reason: None,
        }
    }

    // ── Connection lifecycle ──────────────────────────────────────────────────

    /// Selects a new keyboard identifier.
    ///
    /// Any current connection is closed first (the observer is told, with
    /// [`CloseReason::Superseded`] or [`CloseReason::Cleared`]).  A non-empty
    /// identifier then dials `connection_target(identifier)`; an empty one
    /// leaves the session idle.
    pub fn on_identifier_change(&mut self, identifier: &str) {
        let reason = if identifier.is_empty() {
            CloseReason::Cleared
        } else {
            CloseReason::Superseded
        };
        if let Some(mut link) = self.link.take() {
            info!("closing connection {}: {reason}", link.generation);
            link.connection.close();
            self.notify_closed(reason);
        }

        self.keyboard_id = identifier.to_string();
        if identifier.is_empty() {
            if self.state != SessionState::Idle {
                info!("keyboard identifier cleared; session idle");
            }
            self.state = SessionState::Idle;
            return;
        }

        self.dial();
    }

    fn dial(&mut self) {
        let generation = self.generations.next();
        let target = self.config.connection_target(&self.keyboard_id);
        info!("connecting to {target} (connection {generation})");

        match self.connector.connect(&target, generation) {
            Ok(connection) => {
                self.link = Some(Link {
                    generation,
                    connection,
                });
                self.state = SessionState::Connecting;
            }
            Err(e) => {
                warn!("connection {generation} failed to start: {e}");
                self.finish(CloseReason::TransportError);
            }
        }
    }

    /// Applies one transport notification.
    ///
    /// Notifications whose generation is not the current connection's are
    /// logged and dropped without touching any state.
    pub fn on_transport_event(&mut self, event: TransportEvent) {
        let current = self.link.as_ref().map(|link| link.generation);
        if current != Some(event.generation) {
            debug!(
                "ignoring {:?} from stale connection {}",
                event.kind, event.generation
            );
            return;
        }

        match event.kind {
            TransportEventKind::Opened => {
                if self.state == SessionState::Connecting {
                    info!("connection {} open", event.generation);
                    self.state = SessionState::Open;
                } else {
                    debug!("duplicate open for connection {}", event.generation);
                }
            }
            TransportEventKind::Message(text) => {
                trace!("connection {} sent {text:?}; ignored", event.generation);
            }
            TransportEventKind::Error(detail) => {
                warn!("connection {} failed: {detail}", event.generation);
                if let Some(mut link) = self.link.take() {
                    link.connection.close();
                }
                self.finish(CloseReason::TransportError);
            }
            TransportEventKind::Closed => {
                info!("connection {} closed by remote", event.generation);
                self.link = None;
                self.finish(CloseReason::RemoteClosed);
            }
        }
    }

    /// Shorthand for an `Opened` notification.
    pub fn on_transport_open(&mut self, generation: Generation) {
        self.on_transport_event(TransportEvent::opened(generation));
    }

    /// Shorthand for a `Closed` notification.
    pub fn on_transport_close(&mut self, generation: Generation) {
        self.on_transport_event(TransportEvent::closed(generation));
    }

    /// Shorthand for an `Error` notification.
    pub fn on_transport_error(&mut self, generation: Generation, detail: impl Into<String>) {
        self.on_transport_event(TransportEvent::error(generation, detail));
    }

    /// Ends the session after its connection is gone.
    fn finish(&mut self, reason: CloseReason) {
        self.keyboard_id.clear();
        self.state = SessionState::Closed;
        self.notify_closed(reason);
    }

    fn notify_closed(&mut self, reason: CloseReason) {
        self.last_close_reason = Some(reason);
        self.observer.session_closed(reason);
    }

    // ── Key events ────────────────────────────────────────────────────────────

    /// Forwards a physical key event to the device if the connection is open.
    ///
    /// The returned [`Disposition`] tells the caller whether to suppress the
    /// event's default action.  A send failure ends the session like a
    /// transport error; the event still counts as forwarded.
    pub fn on_physical_key(&mut self, event: &PhysicalKeyEvent) -> Disposition {
        if self.state != SessionState::Open {
            trace!("dropping {:?} {}: session {}", event.direction, event.code, self.state);
            return Disposition::Dropped;
        }
        let Some(link) = self.link.as_mut() else {
            return Disposition::Dropped;
        };

        let token = encode_token(event.direction, &event.code);
        debug!("forwarding {token} (key {:?})", event.key);
        if let Err(e) = link.connection.send(token) {
            let generation = link.generation;
            self.on_transport_error(generation, e.to_string());
        }
        Disposition::Forwarded
    }

    /// Handles a click on an on-screen key widget.
    ///
    /// 1. The key is shift-cased when Shift is the only modifier held.
    /// 2. A key-down is emitted.
    /// 3. For a non-modifier, a key-up follows, then every held modifier is
    ///    released with a key-up of its own, completing the chord.
    ///
    /// A modifier click leaves the modifier held until its widget is
    /// toggled off (see [`RelaySession::on_key_release`]).
    pub fn on_virtual_click(&mut self, click: &VirtualClick) {
        if click.is_modifier {
            self.modifiers.set_pressed(&click.code, true);
        }

        let key = if self.modifiers.shift_casing_applies() {
            shifted_value(&click.key)
        } else {
            click.key.clone()
        };

        self.emit(Direction::Down, &key, &click.code);
        if click.is_modifier {
            return;
        }
        self.emit(Direction::Up, &key, &click.code);

        for released in self.modifiers.release_all() {
            self.emit(Direction::Up, &released.key, &released.code);
        }
    }

    /// Handles a modifier widget being toggled off: the modifier is released
    /// and a key-up is emitted for it.
    pub fn on_key_release(&mut self, key: &str, code: &str) {
        self.modifiers.set_pressed(code, false);
        self.emit(Direction::Up, key, code);
    }

    /// Mirrors a modifier widget's pressed state without emitting anything.
    pub fn sync_modifier(&mut self, code: &str, pressed: bool) {
        self.modifiers.set_pressed(code, pressed);
    }

    fn emit(&mut self, direction: Direction, key: &str, code: &str) {
        let event = SyntheticKeyEvent {
            direction,
            key: key.to_string(),
            code: code.to_string(),
            modifiers: self.modifiers.flags(),
        };
        trace!("emitting {event:?}");
        self.observer.key_event(event);
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// `true` only while the connection is open; gates physical forwarding.
    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    /// The selected identifier; empty when idle or after the connection ended.
    pub fn keyboard_id(&self) -> &str {
        &self.keyboard_id
    }

    /// Generation of the connection currently held, if any.
    pub fn current_generation(&self) -> Option<Generation> {
        self.link.as_ref().map(|link| link.generation)
    }

    pub fn last_close_reason(&self) -> Option<CloseReason> {
        self.last_close_reason
    }

    pub fn modifiers(&self) -> &ModifierTracker {
        &self.modifiers
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
