//! services/session/src/config.rs
//!
//! Defines the runtime's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base path of the backend HTTP contract, e.g. `http://localhost:3000/api/v1`.
    pub api_base_url: String,
    pub log_level: Level,
    /// Fixed recognition language for continuous capture.
    pub recognition_lang: String,
    /// Timeout applied to every backend call, in seconds.
    pub http_timeout_secs: u64,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let api_base_url = std::env::var("API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000/api/v1".to_string());
        // A trailing slash would double up when joining paths.
        let api_base_url = api_base_url.trim_end_matches('/').to_string();
        if api_base_url.is_empty() {
            return Err(ConfigError::InvalidValue(
                "API_BASE_URL".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let recognition_lang =
            std::env::var("RECOGNITION_LANG").unwrap_or_else(|_| "en-US".to_string());

        let http_timeout_secs = match std::env::var("HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue(
                    "HTTP_TIMEOUT_SECS".to_string(),
                    format!("'{}' is not a number of seconds", raw),
                )
            })?,
            Err(_) => 30,
        };

        Ok(Self {
            api_base_url,
            log_level,
            recognition_lang,
            http_timeout_secs,
        })
    }
}
