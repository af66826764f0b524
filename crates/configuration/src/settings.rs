use crate::error::ConfigError;
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so an empty (or missing) `config.toml` yields a
/// working setup that talks to Yahoo Finance and listens on port 5000.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub market_data: MarketDataConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Rejects values that would deserialize fine but make the service unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be greater than 0".to_string(),
            ));
        }
        if self.server.body_limit_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "server.body_limit_bytes must be greater than 0".to_string(),
            ));
        }
        if self.market_data.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "market_data.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.market_data.max_concurrent_fetches == 0 {
            return Err(ConfigError::ValidationError(
                "market_data.max_concurrent_fetches must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Contains parameters for the HTTP listener.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum accepted request body size.
    pub body_limit_bytes: usize,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::ValidationError(format!("invalid server address: {}", e)))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            body_limit_bytes: 1024 * 1024,
        }
    }
}

/// Contains parameters for the upstream market-data source.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketDataConfig {
    /// Base URL of the quote API (e.g., "https://query1.finance.yahoo.com").
    pub base_url: String,
    /// URL that hands out the session cookie the quote API expects.
    pub cookie_url: String,
    pub user_agent: String,
    /// Per-request timeout enforced by the HTTP client.
    pub timeout_secs: u64,
    /// How many symbols may be fetched at once. 1 keeps fetching sequential.
    pub max_concurrent_fetches: usize,
}

impl MarketDataConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            cookie_url: "https://fc.yahoo.com".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
            timeout_secs: 10,
            max_concurrent_fetches: 1,
        }
    }
}

/// Console output style for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
}

/// Contains parameters for the tracing subscriber.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, used when `RUST_LOG` is not set.
    pub level: String,
    pub format: LogFormat,
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub directory: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Full,
            directory: None,
        }
    }
}
