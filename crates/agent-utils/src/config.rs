//! Configuration file helpers
//!
//! Configuration across the workspace is plain JSON. Crates define their own
//! serde types and use these helpers to locate and read them.

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Directory under the user's home that holds agent-rs configuration
pub const USER_CONFIG_DIR: &str = "agent-rs";

/// Errors raised while loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON for the requested type
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Neither HOME nor USERPROFILE is set
    #[error("HOME or USERPROFILE not set")]
    NoHomeDirectory,
}

/// Read and deserialize a JSON configuration file
///
/// # Example
///
/// ```no_run
/// use agent_utils::config::load_json_file;
/// use serde_json::Value;
///
/// let value: Value = load_json_file(".agent-compat.json")?;
/// # Ok::<(), agent_utils::ConfigError>(())
/// ```
pub fn load_json_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let value = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "Loaded config file");
    Ok(value)
}

/// Path of a user-level config file: `~/.config/agent-rs/<file_name>`
pub fn user_config_path(file_name: &str) -> Result<PathBuf, ConfigError> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| ConfigError::NoHomeDirectory)?;

    Ok(PathBuf::from(home)
        .join(".config")
        .join(USER_CONFIG_DIR)
        .join(file_name))
}
