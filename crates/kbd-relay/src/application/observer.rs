//! Observer seam: where synthetic key events and "session closed" go.

use crate::domain::{CloseReason, ClosedNotice, OutboundEvent, SyntheticKeyEvent};

/// Receives everything the session emits for in-page consumers.
pub trait RelayObserver {
    /// A synthetic key event produced by the on-screen keyboard.
    fn key_event(&mut self, event: SyntheticKeyEvent);

    /// The live connection ended.  Fired exactly once per connection.
    fn session_closed(&mut self, reason: CloseReason);
}

/// One thing the session emitted, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Key(SyntheticKeyEvent),
    Closed(CloseReason),
}

impl Notification {
    /// The outward shape; the close reason is dropped.
    pub fn to_outbound(&self) -> OutboundEvent {
        match self {
            Notification::Key(event) => OutboundEvent::Key(event.clone()),
            Notification::Closed(_) => OutboundEvent::Closed(ClosedNotice {}),
        }
    }
}

/// An observer that queues notifications until its owner drains them.
#[derive(Debug, Default)]
pub struct EventBuffer {
    pending: Vec<Notification>,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything queued so far.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }

    /// Queued notifications, oldest first.
    pub fn pending(&self) -> &[Notification] {
        &self.pending
    }

    /// Queued key events, oldest first.
    pub fn key_events(&self) -> Vec<&SyntheticKeyEvent> {
        self.pending
            .iter()
            .filter_map(|n| match n {
                Notification::Key(event) => Some(event),
                Notification::Closed(_) => None,
            })
            .collect()
    }

    /// Queued close reasons, oldest first.
    pub fn close_reasons(&self) -> Vec<CloseReason> {
        self.pending
            .iter()
            .filter_map(|n| match n {
                Notification::Closed(reason) => Some(*reason),
                Notification::Key(_) => None,
            })
            .collect()
    }
}

impl RelayObserver for EventBuffer {
    fn key_event(&mut self, event: SyntheticKeyEvent) {
        self.pending.push(Notification::Key(event));
    }

    fn session_closed(&mut self, reason: CloseReason) {
        self.pending.push(Notification::Closed(reason));
    }
}
