//! Runtime configuration for fleet callers.
//!
//! Values come from `FLEET_*` environment variables with defaults suitable
//! for a local single-file store.

use crate::logging::{default_log_level, parse_level, LogSettings, LoggingError};
use crate::service::fleet_service::DEFAULT_AUDIT_ACTOR;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "FLEET_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "FLEET_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "FLEET_LOG_DIR";
pub const ENV_AUDIT_ACTOR: &str = "FLEET_AUDIT_ACTOR";

const DEFAULT_DB_FILE_NAME: &str = "fleet.sqlite3";

/// Resolved settings for opening the store and starting logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// File logging is skipped when unset.
    pub log_dir: Option<PathBuf>,
    pub audit_actor: String,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            audit_actor: DEFAULT_AUDIT_ACTOR.to_string(),
        }
    }
}

/// Configuration value rejected at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Empty(&'static str),
    Logging(LoggingError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty(key) => write!(f, "`{key}` is set but empty"),
            Self::Logging(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Logging(err) => Some(err),
            Self::Empty(_) => None,
        }
    }
}

impl From<LoggingError> for ConfigError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl FleetConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = non_empty(&lookup, ENV_DB_PATH)? {
            config.db_path = PathBuf::from(path);
        }
        if let Some(actor) = non_empty(&lookup, ENV_AUDIT_ACTOR)? {
            config.audit_actor = actor;
        }
        if let Some(level) = non_empty(&lookup, ENV_LOG_LEVEL)? {
            config.log_level = parse_level(&level)?.to_string();
        }
        if let Some(dir) = non_empty(&lookup, ENV_LOG_DIR)? {
            config.log_dir = Some(LogSettings::parse(&config.log_level, &dir)?.log_dir);
        }

        Ok(config)
    }
}

fn non_empty(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<String>, ConfigError> {
    match lookup(key) {
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty(key)),
        Some(value) => Ok(Some(value.trim().to_string())),
        None => Ok(None),
    }
}
