//! Process configuration for the tracker session.
//!
//! # Responsibility
//! - Load the JSON config file that fixes the store path, logging and the
//!   local submitter identity.
//! - Fall back to defaults when no config file exists.
//!
//! # Invariants
//! - A missing file is not an error; a malformed file is.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Default location, matching the layout the bot has always shipped with.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.json";

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file for the price store.
    pub db_path: PathBuf,
    /// Log level passed to the core logging bootstrap.
    pub log_level: String,
    /// Absolute log directory; `None` runs the session without file logs.
    pub log_dir: Option<PathBuf>,
    /// Stable identity every submission in this session is recorded under.
    pub external_id: String,
    /// Display name stored alongside the identity.
    pub display_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("turnips.db"),
            log_level: turnips_core::default_log_level().to_string(),
            log_dir: None,
            external_id: "local".to_string(),
            display_name: "Local User".to_string(),
        }
    }
}

/// Configuration load failure.
#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(path, err) => {
                write!(f, "could not read config `{}`: {err}", path.display())
            }
            Self::Parse(path, err) => {
                write!(f, "could not parse config `{}`: {err}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(_, err) => Some(err),
            Self::Parse(_, err) => Some(err),
        }
    }
}

/// Loads configuration from `path`, defaulting when the file is absent.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Config::default()),
        Err(err) => return Err(ConfigError::Io(path.to_path_buf(), err)),
    };

    serde_json::from_str(&raw).map_err(|err| ConfigError::Parse(path.to_path_buf(), err))
}
