//! Integration tests for the line-command driver.
//!
//! The driver is run over an in-memory input with the recording transport,
//! so every test is deterministic.

use tokio::sync::mpsc;

use kbd_relay::application::{EventBuffer, RelaySession, TransportEvent};
use kbd_relay::domain::RelayConfig;
use kbd_relay::infrastructure::run_relay;
use kbd_relay::infrastructure::transport::mock::RecordingConnector;

/// Runs `input` through a session that is already open on "kbd-1".
async fn run_open(config: RelayConfig, input: &[u8]) -> (Vec<serde_json::Value>, RecordingConnector) {
    let connector = RecordingConnector::new();
    let handle = connector.clone();
    let mut session = RelaySession::new(config, connector, EventBuffer::new());
    session.on_identifier_change("kbd-1");

    let (tx, mut rx) = mpsc::unbounded_channel();
    tx.send(TransportEvent::opened(handle.generations()[0])).unwrap();

    let mut output = Vec::new();
    run_relay(&mut session, &mut rx, input, &mut output)
        .await
        .unwrap();

    let lines = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    (lines, handle)
}

#[tokio::test]
async fn test_clicks_are_printed_and_echoed_when_enabled() {
    // Arrange
    let config = RelayConfig {
        echo_virtual_keys: true,
        ..RelayConfig::default()
    };
    let input = b"click ShiftLeft\nclick KeyA\ndown KeyB\n";

    // Act
    let (lines, connector) = run_open(config, input).await;

    // Assert: four synthetic events then the shutdown close notice
    let types: Vec<&str> = lines.iter().map(|l| l["type"].as_str().unwrap()).collect();
    assert_eq!(types, vec!["keydown", "keydown", "keyup", "keyup", "kbd-closed"]);
    assert_eq!(lines[1]["key"], "A");
    assert_eq!(lines[1]["shiftKey"], true);
    assert_eq!(
        connector.sent_frames(),
        vec!["dShiftLeft", "dKeyA", "uKeyA", "uShiftLeft", "dKeyB"]
    );
}

#[tokio::test]
async fn test_clicks_stay_off_the_wire_by_default() {
    // Arrange
    let input = b"click ShiftLeft\nclick KeyA\nup KeyA\n";

    // Act
    let (lines, connector) = run_open(RelayConfig::default(), input).await;

    // Assert: four synthetic events and the close notice, one physical frame
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[1]["key"], "A");
    assert_eq!(connector.sent_frames(), vec!["uKeyA"]);
}

#[tokio::test]
async fn test_non_utf8_line_is_skipped() {
    // Arrange: the middle line is not valid UTF-8
    let input = b"down KeyA\n\xff\xfe garbage\ndown KeyB\r\n";

    // Act
    let (lines, connector) = run_open(RelayConfig::default(), input).await;

    // Assert: both good lines applied, and the session still shut down cleanly
    assert_eq!(connector.sent_frames(), vec!["dKeyA", "dKeyB"]);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["type"], "kbd-closed");
}

#[tokio::test]
async fn test_modifier_toggle_and_release_commands() {
    let (lines, _) = run_open(
        RelayConfig::default(),
        b"mod ControlLeft on\nclick KeyC\nclick AltRight\nrelease AltRight\n",
    )
    .await;

    // click KeyC: down, up, ControlLeft released
    assert_eq!(lines[0]["ctrlKey"], true);
    assert_eq!(lines[2]["code"], "ControlLeft");
    assert_eq!(lines[2]["ctrlKey"], false);
    // click AltRight then its release
    assert_eq!(lines[3]["type"], "keydown");
    assert_eq!(lines[3]["altKey"], true);
    assert_eq!(lines[4]["type"], "keyup");
    assert_eq!(lines[4]["key"], "Alt");
    assert_eq!(lines[4]["altKey"], false);
}

#[tokio::test]
async fn test_bad_lines_are_skipped() {
    let (lines, connector) = run_open(RelayConfig::default(), b"\nbogus\ndown\ndown KeyZ\n").await;

    assert_eq!(connector.sent_frames(), vec!["dKeyZ"]);
    assert_eq!(lines.len(), 1, "only the shutdown notice is printed");
}

#[tokio::test]
async fn test_identifier_commands_redial() {
    let (lines, connector) = run_open(RelayConfig::default(), b"id other\nid\n").await;

    assert_eq!(
        connector.targets(),
        vec![
            "ws://127.0.0.1:8080/keyboard/kbd-1".to_string(),
            "ws://127.0.0.1:8080/keyboard/other".to_string(),
        ]
    );
    // superseded, then cleared; nothing left to close at shutdown
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l["type"] == "kbd-closed"));
}
