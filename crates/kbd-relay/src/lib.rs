//! kbd-relay library crate.
//!
//! Relays key activity from a host keyboard and from an on-screen virtual
//! keyboard to a remote device over WebSocket.
//!
//! # Architecture
//!
//! ```text
//! host keyboard / on-screen widgets / identifier selection
//!         ↓
//! [kbd-relay]
//!   ├── domain/           RelayConfig, key event types, generations, states
//!   ├── application/      RelaySession + Connector / RelayObserver seams
//!   └── infrastructure/
//!         ├── transport/  tokio-tungstenite client, recording mock
//!         ├── config_file TOML loading
//!         └── driver      stdin command loop, JSON-lines output
//!         ↓
//! device  (text frames "dKeyA" / "uKeyA" over WebSocket)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async.
//! - `application` depends on `domain` and `kbd-core` only; the session is a
//!   synchronous state machine.
//! - `infrastructure` brings in `tokio`, `tokio-tungstenite` and the file
//!   system.
//!
//! # For beginners: why is the session synchronous?
//!
//! A browser runs every event handler to completion on one thread, and the
//! relay keeps that model: the driver loop pulls one event at a time (an
//! input line or a transport notification) and calls the matching session
//! method.  No locks are needed, and tests can drive the session step by
//! step without a runtime.

/// Domain layer: pure types (no I/O).
pub mod domain;

/// Application layer: the relay session.
pub mod application;

/// Infrastructure layer: WebSocket transport, config file, driver loop.
pub mod infrastructure;
