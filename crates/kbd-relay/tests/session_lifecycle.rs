//! Integration tests for the relay session's public behaviour.
//!
//! The session is driven through its public API with the recording transport
//! standing in for the network, plus one `mockall` expectation test for the
//! connector/connection contract.

use mockall::mock;
use mockall::predicate::eq;

use kbd_core::Direction;
use kbd_relay::application::{
    Connection, Connector, EventBuffer, RelaySession, TransportError,
};
use kbd_relay::domain::{
    CloseReason, Disposition, Generation, PhysicalKeyEvent, RelayConfig, SessionState,
    VirtualClick,
};
use kbd_relay::infrastructure::transport::mock::RecordingConnector;

type Session = RelaySession<RecordingConnector, EventBuffer>;

fn new_session() -> (Session, RecordingConnector) {
    let connector = RecordingConnector::new();
    let handle = connector.clone();
    let session = RelaySession::new(RelayConfig::default(), connector, EventBuffer::new());
    (session, handle)
}

fn emitted(session: &Session) -> Vec<(Direction, String, String)> {
    session
        .observer()
        .key_events()
        .into_iter()
        .map(|e| (e.direction, e.key.clone(), e.code.clone()))
        .collect()
}

fn ev(direction: Direction, key: &str, code: &str) -> (Direction, String, String) {
    (direction, key.to_string(), code.to_string())
}

// ── Event normalization ───────────────────────────────────────────────────────

#[test]
fn test_click_with_shift_cases_key_and_commits_chord() {
    // Arrange: Shift held on the on-screen keyboard
    let (mut session, _) = new_session();
    session.on_virtual_click(&VirtualClick::new("Shift", "ShiftLeft", true));

    // Act
    session.on_virtual_click(&VirtualClick::new("a", "KeyA", false));

    // Assert: Shift down, 'A' down/up, then the chord is committed
    assert_eq!(
        emitted(&session),
        vec![
            ev(Direction::Down, "Shift", "ShiftLeft"),
            ev(Direction::Down, "A", "KeyA"),
            ev(Direction::Up, "A", "KeyA"),
            ev(Direction::Up, "Shift", "ShiftLeft"),
        ]
    );
    let events = session.observer().key_events();
    assert!(events[1].modifiers.shift_key);
    assert!(events[2].modifiers.shift_key);
    assert!(!session.modifiers().is_pressed("ShiftLeft"));
}

#[test]
fn test_shift_casing_covers_punctuation_and_digits() {
    let (mut session, _) = new_session();

    for (key, code, expected) in [(",", "Comma", "<"), ("1", "Digit1", "!"), ("F1", "F1", "F1")] {
        session.sync_modifier("ShiftRight", true);
        session.on_virtual_click(&VirtualClick::new(key, code, false));
        let first = session.observer_mut().drain();
        let down = match &first[0] {
            kbd_relay::application::Notification::Key(e) => e.key.clone(),
            other => panic!("expected key event, got {other:?}"),
        };
        assert_eq!(down, expected, "{code}");
    }
}

#[test]
fn test_chord_cancel_keeps_key_unshifted_and_releases_both() {
    // Arrange
    let (mut session, _) = new_session();
    session.sync_modifier("ShiftLeft", true);
    session.sync_modifier("AltLeft", true);

    // Act
    session.on_virtual_click(&VirtualClick::new("a", "KeyA", false));

    // Assert
    assert_eq!(
        emitted(&session),
        vec![
            ev(Direction::Down, "a", "KeyA"),
            ev(Direction::Up, "a", "KeyA"),
            ev(Direction::Up, "Shift", "ShiftLeft"),
            ev(Direction::Up, "Alt", "AltLeft"),
        ]
    );
    assert!(!session.modifiers().any_pressed());
}

#[test]
fn test_control_with_shift_does_not_case() {
    let (mut session, _) = new_session();
    session.sync_modifier("ShiftLeft", true);
    session.sync_modifier("ControlRight", true);

    session.on_virtual_click(&VirtualClick::new("z", "KeyZ", false));

    assert_eq!(session.observer().key_events()[0].key, "z");
}

#[test]
fn test_keydown_precedes_keyups_and_own_keyup_precedes_releases() {
    let (mut session, _) = new_session();
    session.sync_modifier("MetaLeft", true);
    session.sync_modifier("ControlLeft", true);

    session.on_virtual_click(&VirtualClick::new("c", "KeyC", false));

    let events = emitted(&session);
    assert_eq!(events[0].0, Direction::Down);
    assert_eq!(events[1], ev(Direction::Up, "c", "KeyC"));
    assert!(events[2..].iter().all(|e| e.0 == Direction::Up));
    assert_eq!(events.len(), 4);
}

// ── Connection lifecycle ──────────────────────────────────────────────────────

#[test]
fn test_lifecycle_connecting_open_closed() {
    // Arrange
    let (mut session, connector) = new_session();

    // Act / Assert: identifier set
    session.on_identifier_change("abc");
    assert_eq!(session.state(), SessionState::Connecting);
    assert!(!session.is_open());

    // open acknowledged
    let generation = connector.generations()[0];
    session.on_transport_open(generation);
    assert_eq!(session.state(), SessionState::Open);
    assert!(session.is_open());

    // remote close
    session.on_transport_close(generation);
    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(session.keyboard_id(), "");
    assert!(!session.is_open());
    assert_eq!(
        session.observer().close_reasons(),
        vec![CloseReason::RemoteClosed]
    );
}

#[test]
fn test_superseded_connection_callbacks_do_not_mutate_state() {
    // Arrange: "abc" dialing, then replaced by "xyz" before it opens
    let (mut session, connector) = new_session();
    session.on_identifier_change("abc");
    session.on_identifier_change("xyz");
    let generations = connector.generations();
    let (old, new) = (generations[0], generations[1]);

    // Act: the old connection's late callbacks arrive
    session.on_transport_open(old);
    session.on_transport_error(old, "late");
    session.on_transport_close(old);

    // Assert
    assert_eq!(session.state(), SessionState::Connecting);
    assert_eq!(session.keyboard_id(), "xyz");
    assert_eq!(session.current_generation(), Some(new));
    assert_eq!(connector.closed(), vec![old]);
    assert_eq!(
        connector.targets(),
        vec![
            "ws://127.0.0.1:8080/keyboard/abc".to_string(),
            "ws://127.0.0.1:8080/keyboard/xyz".to_string(),
        ]
    );

    // and the new connection still works
    session.on_transport_open(new);
    assert!(session.is_open());
}

#[test]
fn test_reused_identifier_gets_a_fresh_generation() {
    let (mut session, connector) = new_session();
    session.on_identifier_change("abc");
    let first = connector.generations()[0];
    session.on_transport_close(first);

    session.on_identifier_change("abc");
    session.on_transport_open(first);

    // The first connection's open must not open the second one
    assert_eq!(session.state(), SessionState::Connecting);
}

// ── Physical forwarding ───────────────────────────────────────────────────────

#[test]
fn test_physical_forwarding_only_while_open() {
    // Arrange
    let (mut session, connector) = new_session();
    let key_b = PhysicalKeyEvent::new(Direction::Down, "b", "KeyB");

    // Act / Assert: idle
    assert_eq!(session.on_physical_key(&key_b), Disposition::Dropped);

    // connecting
    session.on_identifier_change("abc");
    assert_eq!(session.on_physical_key(&key_b), Disposition::Dropped);

    // open
    session.on_transport_open(connector.generations()[0]);
    assert_eq!(session.on_physical_key(&key_b), Disposition::Forwarded);

    assert_eq!(connector.sent_frames(), vec!["dKeyB".to_string()]);
}

#[test]
fn test_physical_events_forwarded_in_order_without_casing() {
    let (mut session, connector) = new_session();
    session.on_identifier_change("abc");
    session.on_transport_open(connector.generations()[0]);

    for (direction, key, code) in [
        (Direction::Down, "Shift", "ShiftLeft"),
        (Direction::Down, "A", "KeyA"),
        (Direction::Up, "A", "KeyA"),
        (Direction::Up, "Shift", "ShiftLeft"),
    ] {
        session.on_physical_key(&PhysicalKeyEvent::new(direction, key, code));
    }

    assert_eq!(
        connector.sent_frames(),
        vec!["dShiftLeft", "dKeyA", "uKeyA", "uShiftLeft"]
    );
    assert!(session.observer().key_events().is_empty());
}

// ── Connector contract (mockall) ──────────────────────────────────────────────

mock! {
    Link {}
    impl Connection for Link {
        fn send(&mut self, frame: String) -> Result<(), TransportError>;
        fn close(&mut self);
    }
}

mock! {
    Dialer {}
    impl Connector for Dialer {
        type Connection = MockLink;
        fn connect(&mut self, target: &str, generation: Generation) -> Result<MockLink, TransportError>;
    }
}

#[test]
fn test_connector_contract_dial_send_close() {
    // Arrange: expect exactly one dial, one frame and one close
    let mut dialer = MockDialer::new();
    dialer
        .expect_connect()
        .withf(|target, _| target == "ws://192.168.4.1/keyboard/kbd-1")
        .times(1)
        .returning(|_, _| {
            let mut link = MockLink::new();
            link.expect_send()
                .with(eq("uEnter".to_string()))
                .times(1)
                .returning(|_| Ok(()));
            link.expect_close().times(1).return_const(());
            Ok(link)
        });
    let config = RelayConfig {
        page_url: "192.168.4.1".to_string(),
        ..RelayConfig::default()
    };
    let mut session = RelaySession::new(config, dialer, EventBuffer::new());

    // Act
    session.on_identifier_change("kbd-1");
    let generation = session.current_generation().unwrap();
    session.on_transport_open(generation);
    session.on_physical_key(&PhysicalKeyEvent::new(Direction::Up, "Enter", "Enter"));
    session.on_identifier_change("");

    // Assert
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(
        session.observer().close_reasons(),
        vec![CloseReason::Cleared]
    );
}

#[test]
fn test_connector_refusal_closes_and_notifies() {
    let mut dialer = MockDialer::new();
    dialer.expect_connect().times(1).returning(|target, _| {
        Err(TransportError::Connect {
            target: target.to_string(),
            reason: "refused".to_string(),
        })
    });
    let mut session = RelaySession::new(RelayConfig::default(), dialer, EventBuffer::new());

    session.on_identifier_change("abc");

    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(session.keyboard_id(), "");
    assert_eq!(
        session.last_close_reason(),
        Some(CloseReason::TransportError)
    );
}
