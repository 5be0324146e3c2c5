//! Infrastructure layer for kbd-relay.
//!
//! Everything that touches the outside world:
//!
//! - [`transport`]: WebSocket connections to the device (and a recording
//!   stand-in for tests)
//! - [`config_file`]: reading `RelayConfig` from TOML
//! - [`driver`]: the line-command event loop behind the `kbd-relay` binary

pub mod config_file;
pub mod driver;
pub mod transport;

pub use config_file::{load_config, parse_config, ConfigError};
pub use driver::{run_relay, DriverCommand};
pub use transport::{WsConnection, WsConnector};
