//! Tracker Configuration Settings
//!
//! Configuration types for the service, loaded from environment variables.

use std::time::Duration;

use crate::application::services::CollectorSettings;

/// Market data API key. Redacted in debug output.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key.
    #[must_use]
    pub const fn new(key: String) -> Self {
        Self(key)
    }

    /// The raw key value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ApiKey").field(&"[REDACTED]").finish()
    }
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Port the API server listens on.
    pub http_port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { http_port: 8080 }
    }
}

/// PostgreSQL connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    /// Connection URL.
    pub url: String,
    /// Connection pool size.
    pub max_connections: u32,
}

/// Market data API settings.
#[derive(Debug, Clone)]
pub struct MarketDataSettings {
    /// Base URL of the market data API.
    pub base_url: String,
    /// API key sent with every request.
    pub api_key: ApiKey,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

/// Complete tracker configuration.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// HTTP server settings.
    pub server: ServerSettings,
    /// Database settings.
    pub database: DatabaseSettings,
    /// Market data API settings.
    pub market_data: MarketDataSettings,
    /// Collector behavior.
    pub collector: CollectorSettings,
}

impl TrackerConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required environment variable is missing or
    /// empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = require_env("TRACKER_DATABASE_URL")?;
        let base_url = require_env("TRACKER_API_BASE_URL")?;
        let api_key = require_env("TRACKER_API_KEY")?;

        let server = ServerSettings {
            http_port: parse_env_u16("TRACKER_HTTP_PORT", ServerSettings::default().http_port),
        };

        let database = DatabaseSettings {
            url: database_url,
            max_connections: parse_env_u32("TRACKER_DB_MAX_CONNECTIONS", 5),
        };

        let market_data = MarketDataSettings {
            base_url,
            api_key: ApiKey::new(api_key),
            request_timeout: parse_env_duration_secs(
                "TRACKER_API_TIMEOUT_SECS",
                Duration::from_secs(10),
            ),
        };

        let collector_defaults = CollectorSettings::default();
        let collector = CollectorSettings {
            poll_interval: parse_env_duration_secs(
                "TRACKER_POLL_INTERVAL_SECS",
                collector_defaults.poll_interval,
            ),
            lookback: parse_env_duration_secs("TRACKER_LOOKBACK_SECS", collector_defaults.lookback),
        };

        Ok(Self {
            server,
            database,
            market_data,
            collector,
        })
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
}

fn require_env(key: &str) -> Result<String, ConfigError> {
    let value =
        std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))?;
    if value.is_empty() {
        return Err(ConfigError::EmptyValue(key.to_string()));
    }
    Ok(value)
}

fn parse_env_u16(key: &str, default: u16) -> u16 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_duration_secs(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}
