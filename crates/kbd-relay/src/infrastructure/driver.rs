//! Line-command driver: feeds the relay session from a text stream.
//!
//! The `kbd-relay` binary has no browser, so standard input stands in for
//! the page's event sources.  One command per line:
//!
//! | Command                 | Session operation                        |
//! |-------------------------|------------------------------------------|
//! | `id <identifier>`       | select a keyboard (dials the device)     |
//! | `id`                    | clear the identifier                     |
//! | `down <code> [key]`     | physical key-down                        |
//! | `up <code> [key]`       | physical key-up                          |
//! | `click <code> [key]`    | on-screen key widget clicked             |
//! | `mod <code> on\|off`    | modifier widget pressed state changed    |
//! | `release <code> [key]`  | modifier widget toggled off              |
//!
//! When `key` is omitted the catalog's default for `code` is used.  Lines
//! that are not UTF-8 or not a known command are logged and skipped.
//!
//! Everything the session emits is written to the output as one JSON object
//! per line: synthetic key events, and `{"type":"kbd-closed"}` when a
//! connection ends.
//!
//! # Event loop
//!
//! A single loop multiplexes input lines and transport events with
//! `tokio::select!`, so the session only ever runs on one task.  Transport
//! events are polled first: a connection that has just opened is open
//! before the next input line is applied.

use anyhow::Context;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

use kbd_core::{Direction, KeyCode};

use crate::application::{
    Connector, EventBuffer, Notification, RelaySession, TransportEvent,
};
use crate::domain::{PhysicalKeyEvent, VirtualClick};

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCommand {
    SetIdentifier(String),
    Physical(PhysicalKeyEvent),
    Click(VirtualClick),
    Modifier { code: String, pressed: bool },
    Release { key: String, code: String },
}

/// Why an input line was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command {0:?}")]
    UnknownCommand(String),

    #[error("{0} requires a key code")]
    MissingCode(&'static str),

    #[error("expected \"on\" or \"off\", got {0:?}")]
    InvalidToggle(String),
}

/// The key value a widget or keyboard reports for `code` when none is given.
fn default_key(code: &str) -> String {
    KeyCode::from_code(code).map_or_else(|| code.to_string(), |k| k.default_key().to_string())
}

/// Takes `<code> [key]` off the argument list.
fn code_and_key<'a>(
    args: &mut impl Iterator<Item = &'a str>,
    verb: &'static str,
) -> Result<(String, String), CommandError> {
    let code = args.next().ok_or(CommandError::MissingCode(verb))?;
    let key = args.next().map_or_else(|| default_key(code), str::to_string);
    Ok((code.to_string(), key))
}

/// Parses one input line.
///
/// # Errors
///
/// Returns [`CommandError`] for blank lines, unknown commands and missing or
/// malformed arguments.
pub fn parse_command(line: &str) -> Result<DriverCommand, CommandError> {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let mut args = rest.split_whitespace();

    match verb {
        "" => Err(CommandError::Empty),
        "id" => Ok(DriverCommand::SetIdentifier(rest.to_string())),
        "down" => {
            let (code, key) = code_and_key(&mut args, "down")?;
            Ok(DriverCommand::Physical(PhysicalKeyEvent::new(Direction::Down, key, code)))
        }
        "up" => {
            let (code, key) = code_and_key(&mut args, "up")?;
            Ok(DriverCommand::Physical(PhysicalKeyEvent::new(Direction::Up, key, code)))
        }
        "click" => {
            let (code, key) = code_and_key(&mut args, "click")?;
            let is_modifier = KeyCode::from_code(&code).is_some_and(KeyCode::is_modifier);
            Ok(DriverCommand::Click(VirtualClick::new(key, code, is_modifier)))
        }
        "mod" => {
            let code = args.next().ok_or(CommandError::MissingCode("mod"))?;
            let pressed = match args.next() {
                Some("on") => true,
                Some("off") => false,
                other => return Err(CommandError::InvalidToggle(other.unwrap_or("").to_string())),
            };
            Ok(DriverCommand::Modifier {
                code: code.to_string(),
                pressed,
            })
        }
        "release" => {
            let (code, key) = code_and_key(&mut args, "release")?;
            Ok(DriverCommand::Release { key, code })
        }
        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

/// Applies one command to the session.
pub fn apply_command<C: Connector>(
    session: &mut RelaySession<C, EventBuffer>,
    command: DriverCommand,
) {
    match command {
        DriverCommand::SetIdentifier(id) => session.on_identifier_change(&id),
        DriverCommand::Physical(event) => {
            let disposition = session.on_physical_key(&event);
            debug!("{:?} {}: {disposition:?}", event.direction, event.code);
        }
        DriverCommand::Click(click) => session.on_virtual_click(&click),
        DriverCommand::Modifier { code, pressed } => session.sync_modifier(&code, pressed),
        DriverCommand::Release { key, code } => session.on_key_release(&key, &code),
    }
}

/// Writes everything the session has emitted as JSON lines.
///
/// With `echo_virtual_keys` set, each synthetic key event is then offered to
/// the session as a physical event, the way a page-level key listener
/// receives events the on-screen keyboard dispatches.
///
/// # Errors
///
/// Returns an error if writing to `output` fails.
pub async fn flush_notifications<C, W>(
    session: &mut RelaySession<C, EventBuffer>,
    output: &mut W,
) -> anyhow::Result<()>
where
    C: Connector,
    W: AsyncWrite + Unpin,
{
    let echo = session.config().echo_virtual_keys;
    loop {
        let batch = session.observer_mut().drain();
        if batch.is_empty() {
            break;
        }
        for notification in &batch {
            let mut line = serde_json::to_vec(&notification.to_outbound())
                .context("failed to encode event")?;
            line.push(b'\n');
            output.write_all(&line).await.context("failed to write event")?;
            if let (true, Notification::Key(event)) = (echo, notification) {
                session.on_physical_key(&PhysicalKeyEvent::from(event));
            }
        }
    }
    output.flush().await.context("failed to flush output")
}

/// Parses and applies one raw input line.  Lines that are not UTF-8 or not a
/// valid command are logged and skipped.
fn apply_line<C: Connector>(session: &mut RelaySession<C, EventBuffer>, raw: Vec<u8>) {
    let line = match String::from_utf8(raw) {
        Ok(line) => line,
        Err(e) => {
            warn!("ignoring input line that is not UTF-8: {e}");
            return;
        }
    };
    if line.trim().is_empty() {
        return;
    }
    match parse_command(&line) {
        Ok(command) => apply_command(session, command),
        Err(e) => warn!("ignoring {:?}: {e}", line.trim_end()),
    }
}

/// Runs the relay until `input` reaches end-of-file.
///
/// On exit the identifier is cleared, closing any live connection, and the
/// resulting notification is written.  This also happens when reading
/// `input` fails.
///
/// # Errors
///
/// Returns an error if reading `input` or writing `output` fails.
pub async fn run_relay<C, R, W>(
    session: &mut RelaySession<C, EventBuffer>,
    transport_events: &mut UnboundedReceiver<TransportEvent>,
    input: R,
    output: &mut W,
) -> anyhow::Result<()>
where
    C: Connector,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.split(b'\n');
    let mut read_error = None;
    flush_notifications(session, output).await?;

    loop {
        tokio::select! {
            biased;

            Some(event) = transport_events.recv() => session.on_transport_event(event),
            line = lines.next_segment() => match line {
                Ok(Some(raw)) => apply_line(session, raw),
                Ok(None) => {
                    info!("input closed; shutting down");
                    break;
                }
                Err(e) => {
                    warn!("failed to read input: {e}; shutting down");
                    read_error = Some(e);
                    break;
                }
            },
        }
        flush_notifications(session, output).await?;
    }

    session.on_identifier_change("");
    flush_notifications(session, output).await?;
    match read_error {
        Some(e) => Err(anyhow::Error::new(e).context("failed to read input")),
        None => Ok(()),
    }
}
