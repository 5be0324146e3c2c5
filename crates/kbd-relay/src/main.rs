//! kbd-relay: virtual-keyboard key-event relay, entry point.
//!
//! Reads line commands on standard input (see
//! [`kbd_relay::infrastructure::driver`]), forwards physical key activity to
//! the selected device over WebSocket as `d<code>` / `u<code>` text frames,
//! and prints synthetic key events and `{"type":"kbd-closed"}` notifications
//! to standard output as JSON lines.  Logs go to standard error.
//!
//! # Usage
//!
//! ```text
//! kbd-relay [OPTIONS]
//!
//! Options:
//!   --config <PATH>          TOML config file
//!   --scheme <ws|wss>        URL scheme              [default: ws]
//!   --page-url <HOST/PATH>   Device page location    [default: 127.0.0.1:8080/]
//!   --path-suffix <SEG>      Segment before the id   [default: keyboard/]
//!   --keyboard-id <ID>       Connect at startup
//!   --echo                   Also send on-screen keys to the device
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable            | Flag              |
//! |---------------------|-------------------|
//! | `KBD_CONFIG`        | `--config`        |
//! | `KBD_SCHEME`        | `--scheme`        |
//! | `KBD_PAGE_URL`      | `--page-url`      |
//! | `KBD_PATH_SUFFIX`   | `--path-suffix`   |
//! | `KBD_KEYBOARD_ID`   | `--keyboard-id`   |
//!
//! Precedence: flag, then environment variable, then config file, then the
//! built-in default.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kbd_relay::application::{EventBuffer, RelaySession};
use kbd_relay::domain::{RelayConfig, Scheme};
use kbd_relay::infrastructure::driver::flush_notifications;
use kbd_relay::infrastructure::{load_config, run_relay, WsConnector};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Virtual-keyboard key-event relay.
#[derive(Debug, Parser)]
#[command(
    name = "kbd-relay",
    about = "Relays keyboard activity to a device over WebSocket",
    version
)]
struct Cli {
    /// TOML config file; its values sit below flags and environment variables.
    #[arg(long, env = "KBD_CONFIG")]
    config: Option<PathBuf>,

    /// URL scheme used to reach the device (`ws` or `wss`).
    #[arg(long, env = "KBD_SCHEME")]
    scheme: Option<String>,

    /// Host and path of the device page, e.g. `192.168.4.1/`.
    #[arg(long, env = "KBD_PAGE_URL")]
    page_url: Option<String>,

    /// Path segment between the page location and the keyboard identifier.
    #[arg(long, env = "KBD_PATH_SUFFIX")]
    path_suffix: Option<String>,

    /// Keyboard identifier to connect to at startup.
    #[arg(long, env = "KBD_KEYBOARD_ID")]
    keyboard_id: Option<String>,

    /// Also send on-screen key clicks to the device, as if typed physically.
    #[arg(long)]
    echo: bool,
}

impl Cli {
    /// Builds the effective [`RelayConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded or `--scheme` is
    /// not `ws` or `wss`.
    fn into_relay_config(self) -> anyhow::Result<RelayConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => RelayConfig::default(),
        };

        if let Some(scheme) = &self.scheme {
            config.scheme = scheme
                .parse::<Scheme>()
                .with_context(|| format!("invalid --scheme '{scheme}'"))?;
        }
        if let Some(page_url) = self.page_url {
            config.page_url = page_url;
        }
        if let Some(path_suffix) = self.path_suffix {
            config.path_suffix = path_suffix;
        }
        if self.echo {
            config.echo_virtual_keys = true;
        }
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Standard output carries the JSON event stream, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let keyboard_id = cli.keyboard_id.clone();
    let config = cli.into_relay_config()?;

    info!(
        "kbd-relay starting: {}",
        config.connection_target("<id>")
    );

    let (connector, mut transport_events) = WsConnector::channel();
    let mut session = RelaySession::new(config, connector, EventBuffer::new());
    let mut stdout = tokio::io::stdout();

    if let Some(id) = keyboard_id.as_deref().filter(|id| !id.is_empty()) {
        session.on_identifier_change(id);
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    tokio::select! {
        result = run_relay(&mut session, &mut transport_events, stdin, &mut stdout) => result?,
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl+C")?;
            info!("received Ctrl+C; shutting down");
            session.on_identifier_change("");
            flush_notifications(&mut session, &mut stdout).await?;
        }
    }

    info!("kbd-relay stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["kbd-relay"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_defaults_produce_default_config() {
        // Arrange: no flags
        let cli = Cli {
            config: None,
            scheme: None,
            page_url: None,
            path_suffix: None,
            keyboard_id: None,
            echo: false,
        };

        // Act
        let config = cli.into_relay_config().unwrap();

        // Assert
        assert_eq!(config, RelayConfig::default());
    }

    #[test]
    fn test_page_url_override() {
        let config = cli(&["--page-url", "192.168.4.1/"])
            .into_relay_config()
            .unwrap();
        assert_eq!(config.connection_target("k"), "ws://192.168.4.1/keyboard/k");
    }

    #[test]
    fn test_scheme_override() {
        let config = cli(&["--scheme", "wss"]).into_relay_config().unwrap();
        assert_eq!(config.scheme, Scheme::Wss);
    }

    #[test]
    fn test_invalid_scheme_returns_error() {
        let result = cli(&["--scheme", "http"]).into_relay_config();
        assert!(result.is_err());
    }

    #[test]
    fn test_path_suffix_override() {
        let config = cli(&["--path-suffix", "kb/"]).into_relay_config().unwrap();
        assert_eq!(config.path_suffix, "kb/");
    }

    #[test]
    fn test_echo_flag() {
        let config = cli(&["--echo"]).into_relay_config().unwrap();
        assert!(config.echo_virtual_keys);
    }

    #[test]
    fn test_keyboard_id_flag() {
        let cli = cli(&["--keyboard-id", "kbd-7"]);
        assert_eq!(cli.keyboard_id.as_deref(), Some("kbd-7"));
    }

    #[test]
    fn test_missing_config_file_returns_error() {
        let result = cli(&["--config", "/nonexistent/kbd-relay.toml"]).into_relay_config();
        assert!(result.is_err());
    }
}
