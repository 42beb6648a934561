//! Configuration management for the service.

use std::env;
use std::time::Duration;

/// Default remote endpoint: a public mock API whose posts stand in for quotes.
pub const DEFAULT_REMOTE_URL: &str = "https://jsonplaceholder.typicode.com/posts";

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the local API binds to
    pub host: String,
    /// Port of the local API
    pub port: u16,
    /// SQLite connection URL for the key-value store
    pub database_url: String,
    /// Remote endpoint used for both pull (GET) and push (POST)
    pub remote_url: String,
    /// Period of the automatic sync
    pub sync_interval: Duration,
    /// Upper bound for a single remote request
    pub fetch_timeout: Duration,
    /// Whether periodic sync starts enabled
    pub auto_sync: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://quotes.db?mode=rwc".to_string());

        let remote_url = env::var("REMOTE_URL").unwrap_or_else(|_| DEFAULT_REMOTE_URL.to_string());

        let sync_interval = Duration::from_secs(parse_secs("SYNC_INTERVAL_SECS", 30)?);
        let fetch_timeout = Duration::from_secs(parse_secs("FETCH_TIMEOUT_SECS", 10)?);

        let auto_sync = match env::var("AUTO_SYNC") {
            Ok(value) => parse_bool(&value).ok_or(ConfigError::InvalidBool("AUTO_SYNC"))?,
            Err(_) => true,
        };

        Ok(Self {
            host,
            port,
            database_url,
            remote_url,
            sync_interval,
            fetch_timeout,
            auto_sync,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            database_url: "sqlite::memory:".to_string(),
            remote_url: DEFAULT_REMOTE_URL.to_string(),
            sync_interval: Duration::from_secs(30),
            fetch_timeout: Duration::from_secs(10),
            auto_sync: true,
        }
    }
}

fn parse_secs(var: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(var) {
        Ok(value) => match value.parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(secs),
            _ => Err(ConfigError::InvalidDuration(var)),
        },
        Err(_) => Ok(default),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid PORT value")]
    InvalidPort,

    #[error("Invalid {0} value: expected a positive number of seconds")]
    InvalidDuration(&'static str),

    #[error("Invalid {0} value: expected true or false")]
    InvalidBool(&'static str),
}
