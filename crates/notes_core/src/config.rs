//! Runtime configuration loaded from environment variables.
//!
//! # Responsibility
//! - Decide which notes backend to talk to and where logs go.
//!
//! # Invariants
//! - Blank values are treated as unset.
//! - A remote API URL is never accepted without an API key.
//!
//! Recognized variables: `NOTES_API_URL`, `NOTES_API_KEY`,
//! `NOTES_API_TIMEOUT_SECS`, `NOTES_DB_PATH`, `NOTES_LOG_LEVEL`,
//! `NOTES_LOG_DIR`.

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_API_URL: &str = "NOTES_API_URL";
pub const ENV_API_KEY: &str = "NOTES_API_KEY";
pub const ENV_API_TIMEOUT_SECS: &str = "NOTES_API_TIMEOUT_SECS";
pub const ENV_DB_PATH: &str = "NOTES_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "NOTES_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "NOTES_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "notes_local.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingApiKey,
    InvalidTimeout(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "{ENV_API_URL} is set but {ENV_API_KEY} is missing"),
            Self::InvalidTimeout(value) => write!(
                f,
                "{ENV_API_TIMEOUT_SECS} must be a positive integer, got `{value}`"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Connection settings for the managed GraphQL notes API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub url: String,
    pub api_key: String,
    /// `None` leaves the transport default (no timeout).
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesConfig {
    /// Remote backend; `None` selects the local SQLite backend.
    pub api: Option<ApiConfig>,
    pub db_path: PathBuf,
    pub log_level: String,
    /// Logging stays off when unset.
    pub log_dir: Option<String>,
}

impl NotesConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api = match read(ENV_API_URL) {
            Some(url) => {
                let api_key = read(ENV_API_KEY).ok_or(ConfigError::MissingApiKey)?;
                let timeout = match read(ENV_API_TIMEOUT_SECS) {
                    Some(raw) => Some(parse_timeout(&raw)?),
                    None => None,
                };
                Some(ApiConfig {
                    url,
                    api_key,
                    timeout,
                })
            }
            None => None,
        };

        let db_path = read(ENV_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));

        Ok(Self {
            api,
            db_path,
            log_level: read(ENV_LOG_LEVEL).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(ENV_LOG_DIR),
        })
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}
