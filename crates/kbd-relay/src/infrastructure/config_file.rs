//! TOML configuration file loading.
//!
//! Every field is optional; anything left out keeps its default:
//!
//! ```toml
//! scheme = "ws"
//! page_url = "192.168.4.1/"
//! path_suffix = "keyboard/"
//! echo_virtual_keys = false
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::RelayConfig;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Parses a config from TOML text.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] for malformed TOML, unknown scheme values
/// or fields of the wrong type.
pub fn parse_config(text: &str) -> Result<RelayConfig, ConfigError> {
    Ok(toml::from_str(text)?)
}

/// Loads a config from the file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read (including when it
/// does not exist) and [`ConfigError::Parse`] if its content is invalid.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&text)
}
