//! Application configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! development defaults.

use std::env;

use crate::session::DEFAULT_SESSION_LIFETIME_SECS;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite database file path
    pub database_path: String,

    /// Secret key for signing session tokens
    pub jwt_secret: String,

    /// Session token lifetime in seconds
    pub session_lifetime_secs: i64,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = AppConfig {
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "./caravel.db".to_string()),

            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                // In production this MUST be set via environment variable
                "caravel-dev-secret-change-in-production".to_string()
            }),

            session_lifetime_secs: env::var("SESSION_LIFETIME_SECS")
                .unwrap_or_else(|_| DEFAULT_SESSION_LIFETIME_SECS.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SESSION_LIFETIME_SECS".to_string()))?,
        };

        if config.session_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue(
                "SESSION_LIFETIME_SECS".to_string(),
            ));
        }

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
