//! Runtime configuration read from environment variables.
//!
//! # Responsibility
//! - Choose the storage backend and logging settings for executables.
//!
//! # Invariants
//! - Unset variables fall back to documented defaults.
//! - Malformed values are rejected, never silently ignored.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const BACKEND_VAR: &str = "CONTACT_STORE_BACKEND";
pub const DB_PATH_VAR: &str = "CONTACT_STORE_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "CONTACT_STORE_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "CONTACT_STORE_LOG_DIR";

/// Storage backend selected by configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// In-process repository; contents vanish with the process.
    Memory,
    /// SQLite file at the given path.
    SqliteFile(PathBuf),
    /// Private in-memory SQLite database.
    SqliteMemory,
}

/// Resolved store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: BackendConfig,
    pub log_level: &'static str,
    /// Logging stays disabled when `None`.
    pub log_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnknownBackend(String),
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownBackend(value) => write!(
                f,
                "unknown {BACKEND_VAR} value `{value}`; expected memory|sqlite"
            ),
            Self::InvalidLogLevel(message) => write!(f, "invalid {LOG_LEVEL_VAR}: {message}"),
        }
    }
}

impl Error for ConfigError {}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::Memory,
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl StoreConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let backend = match non_empty(BACKEND_VAR)
            .map(|value| value.to_ascii_lowercase())
            .as_deref()
        {
            None | Some("memory") => BackendConfig::Memory,
            Some("sqlite") => match non_empty(DB_PATH_VAR) {
                Some(path) => BackendConfig::SqliteFile(PathBuf::from(path)),
                None => BackendConfig::SqliteMemory,
            },
            Some(other) => return Err(ConfigError::UnknownBackend(other.to_string())),
        };

        let log_level = match non_empty(LOG_LEVEL_VAR) {
            Some(level) => normalize_level(&level).map_err(ConfigError::InvalidLogLevel)?,
            None => default_log_level(),
        };

        Ok(Self {
            backend,
            log_level,
            log_dir: non_empty(LOG_DIR_VAR),
        })
    }
}
