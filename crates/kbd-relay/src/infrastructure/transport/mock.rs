//! Recording transport for unit and integration testing.
//!
//! Lets tests drive the relay session without a network: every dial, frame
//! and close is recorded, and failures can be injected.  Clones share the
//! same record, so a test can keep one handle while the session owns
//! another.

use std::sync::{Arc, Mutex};

use crate::application::transport::{Connection, Connector, TransportError};
use crate::domain::Generation;

#[derive(Debug, Default)]
struct Record {
    dials: Vec<(String, Generation)>,
    sent: Vec<(Generation, String)>,
    closed: Vec<Generation>,
    fail_next_connect: bool,
    fail_sends: bool,
}

/// A [`Connector`] that records instead of dialing.
#[derive(Debug, Clone, Default)]
pub struct RecordingConnector {
    record: Arc<Mutex<Record>>,
}

impl RecordingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `connect` call fail.
    pub fn fail_next_connect(&self) {
        self.record.lock().expect("lock poisoned").fail_next_connect = true;
    }

    /// Makes every subsequent `send` fail.
    pub fn fail_sends(&self) {
        self.record.lock().expect("lock poisoned").fail_sends = true;
    }

    /// URLs dialed, oldest first.
    pub fn targets(&self) -> Vec<String> {
        let record = self.record.lock().expect("lock poisoned");
        record.dials.iter().map(|(t, _)| t.clone()).collect()
    }

    /// Generations handed to `connect`, oldest first.
    pub fn generations(&self) -> Vec<Generation> {
        let record = self.record.lock().expect("lock poisoned");
        record.dials.iter().map(|(_, g)| *g).collect()
    }

    /// Every frame sent on any connection, oldest first.
    pub fn sent_frames(&self) -> Vec<String> {
        let record = self.record.lock().expect("lock poisoned");
        record.sent.iter().map(|(_, f)| f.clone()).collect()
    }

    /// Frames with the connection they were sent on.
    pub fn sent(&self) -> Vec<(Generation, String)> {
        self.record.lock().expect("lock poisoned").sent.clone()
    }

    /// Connections closed by the session, in close order.
    pub fn closed(&self) -> Vec<Generation> {
        self.record.lock().expect("lock poisoned").closed.clone()
    }
}

impl Connector for RecordingConnector {
    type Connection = RecordingConnection;

    fn connect(
        &mut self,
        target: &str,
        generation: Generation,
    ) -> Result<RecordingConnection, TransportError> {
        let mut record = self.record.lock().expect("lock poisoned");
        record.dials.push((target.to_string(), generation));
        if std::mem::take(&mut record.fail_next_connect) {
            return Err(TransportError::Connect {
                target: target.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(RecordingConnection {
            generation,
            closed: false,
            record: Arc::clone(&self.record),
        })
    }
}

/// The [`Connection`] handed out by [`RecordingConnector`].
#[derive(Debug)]
pub struct RecordingConnection {
    generation: Generation,
    closed: bool,
    record: Arc<Mutex<Record>>,
}

impl Connection for RecordingConnection {
    fn send(&mut self, frame: String) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::ConnectionGone);
        }
        let mut record = self.record.lock().expect("lock poisoned");
        if record.fail_sends {
            return Err(TransportError::Send("injected failure".to_string()));
        }
        record.sent.push((self.generation, frame));
        Ok(())
    }

    fn close(&mut self) {
        if !std::mem::replace(&mut self.closed, true) {
            self.record
                .lock()
                .expect("lock poisoned")
                .closed
                .push(self.generation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GenerationCounter;

    #[test]
    fn test_records_dials_frames_and_closes() {
        // Arrange
        let mut connector = RecordingConnector::new();
        let handle = connector.clone();
        let generation = GenerationCounter::new().next();

        // Act
        let mut conn = connector.connect("ws://h/keyboard/1", generation).unwrap();
        conn.send("dKeyA".to_string()).unwrap();
        conn.close();
        conn.close();

        // Assert: the clone sees everything, and close is recorded once
        assert_eq!(handle.targets(), vec!["ws://h/keyboard/1".to_string()]);
        assert_eq!(handle.sent(), vec![(generation, "dKeyA".to_string())]);
        assert_eq!(handle.closed(), vec![generation]);
    }

    #[test]
    fn test_send_after_close_fails() {
        let mut connector = RecordingConnector::new();
        let mut conn = connector
            .connect("ws://h/", GenerationCounter::new().next())
            .unwrap();
        conn.close();

        assert!(matches!(
            conn.send("dKeyA".to_string()),
            Err(TransportError::ConnectionGone)
        ));
    }

    #[test]
    fn test_injected_connect_failure_applies_once() {
        let mut connector = RecordingConnector::new();
        let mut counter = GenerationCounter::new();
        connector.fail_next_connect();

        assert!(connector.connect("ws://h/", counter.next()).is_err());
        assert!(connector.connect("ws://h/", counter.next()).is_ok());
        assert_eq!(connector.targets().len(), 2);
    }
}
