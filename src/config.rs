use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const API_URL_VAR: &str = "RESTO_API_URL";
pub const SESSION_DB_VAR: &str = "RESTO_SESSION_DB";
pub const REFRESH_INTERVAL_VAR: &str = "RESTO_REFRESH_INTERVAL_SECS";

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_SESSION_DB: &str = "resto_admin.db";
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} must be a positive number of seconds, got {value:?}")]
    InvalidInterval { var: &'static str, value: String },

    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Backend base URL, without trailing slash.
    pub api_url: String,
    /// SQLite file holding the persisted credentials.
    pub session_db: PathBuf,
    pub refresh_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_db: PathBuf::from(DEFAULT_SESSION_DB),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
        }
    }
}

impl AppConfig {
    /// Reads the process environment, after loading `.env` when one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(API_URL_VAR) {
            let url = url.trim().trim_end_matches('/');
            if url.is_empty() {
                return Err(ConfigError::Empty { var: API_URL_VAR });
            }
            config.api_url = url.to_string();
        }

        if let Some(path) = lookup(SESSION_DB_VAR) {
            if path.trim().is_empty() {
                return Err(ConfigError::Empty { var: SESSION_DB_VAR });
            }
            config.session_db = PathBuf::from(path.trim());
        }

        if let Some(value) = lookup(REFRESH_INTERVAL_VAR) {
            let secs = value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::InvalidInterval {
                    var: REFRESH_INTERVAL_VAR,
                    value: value.clone(),
                })?;
            config.refresh_interval = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
