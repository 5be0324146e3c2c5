//! Relay configuration types.
//!
//! [`RelayConfig`] says *where* the device lives.  Given the keyboard
//! identifier the user selected, [`RelayConfig::connection_target`] produces
//! the WebSocket URL the session dials:
//!
//! ```text
//! <scheme>://<page_url>[/]<path_suffix><identifier>
//! ws://192.168.4.1/keyboard/kbd-1
//! ```
//!
//! The struct is plain data: reading it from a TOML file lives in
//! `infrastructure::config_file`, and overriding it from CLI flags happens in
//! `main.rs`.  The `#[serde(default = ...)]` attributes let a config file
//! name only the fields it wants to change.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a scheme string is neither `ws` nor `wss`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported URL scheme {0:?} (expected \"ws\" or \"wss\")")]
pub struct UnknownScheme(pub String);

/// WebSocket URL scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Plain-text WebSocket, the scheme the device firmware serves.
    #[default]
    Ws,
    /// WebSocket over TLS.
    Wss,
}

impl Scheme {
    /// Returns the scheme as it appears in a URL.
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Ws => "ws",
            Scheme::Wss => "wss",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = UnknownScheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ws" => Ok(Scheme::Ws),
            "wss" => Ok(Scheme::Wss),
            other => Err(UnknownScheme(other.to_string())),
        }
    }
}

/// All runtime configuration for the relay.
///
/// # Example
///
/// ```rust
/// use kbd_relay::domain::RelayConfig;
///
/// let cfg = RelayConfig::default();
/// assert_eq!(cfg.connection_target("kbd-1"), "ws://127.0.0.1:8080/keyboard/kbd-1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// URL scheme used to reach the device.
    #[serde(default)]
    pub scheme: Scheme,

    /// Host plus path of the page the keyboard is served from
    /// (`"192.168.4.1/"`, `"device.local:8080/ui"`).
    #[serde(default = "default_page_url")]
    pub page_url: String,

    /// Path segment placed between the page location and the identifier.
    #[serde(default = "default_path_suffix")]
    pub path_suffix: String,

    /// Also feed synthetic key events through the physical-key path, the way
    /// a page-level key listener sees events dispatched by the on-screen
    /// keyboard.  Off by default: clicks are reported, never sent.
    #[serde(default)]
    pub echo_virtual_keys: bool,
}

fn default_page_url() -> String {
    "127.0.0.1:8080/".to_string()
}

fn default_path_suffix() -> String {
    "keyboard/".to_string()
}

impl Default for RelayConfig {
    /// | Field             | Default             |
    /// |-------------------|---------------------|
    /// | scheme            | `ws`                |
    /// | page_url          | `127.0.0.1:8080/`   |
    /// | path_suffix       | `keyboard/`         |
    /// | echo_virtual_keys | `false`             |
    fn default() -> Self {
        Self {
            scheme: Scheme::default(),
            page_url: default_page_url(),
            path_suffix: default_path_suffix(),
            echo_virtual_keys: false,
        }
    }
}

impl RelayConfig {
    /// Builds the WebSocket URL for keyboard `identifier`.
    ///
    /// A `/` is inserted after the page location when it does not already end
    /// in one.  The identifier is appended verbatim.
    pub fn connection_target(&self, identifier: &str) -> String {
        let separator = if self.page_url.ends_with('/') { "" } else { "/" };
        format!(
            "{}://{}{}{}{}",
            self.scheme, self.page_url, separator, self.path_suffix, identifier
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
