//! Application configuration loaded from environment variables.

use std::time::Duration;

use upstream::{CatalogConfig, OrderConfig};

/// Process configuration, read once at startup.
///
/// Recognized environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `5000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `CATALOG_URL` — catalog service base URL
/// - `ORDER_URL` — order service base URL
/// - `ORDER_API_KEY` — shared secret for the order service
/// - `UPSTREAM_TIMEOUT_MS` — per-call timeout for upstream requests
/// - `UPSTREAM_RETRY_MAX_ATTEMPTS` — attempt cap for idempotent calls
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub catalog: CatalogConfig,
    pub orders: OrderConfig,
}

impl Config {
    /// Reads every setting from the environment, defaulting where unset.
    pub fn from_env() -> Self {
        let mut catalog = CatalogConfig::default();
        let mut orders = OrderConfig::default();

        if let Ok(url) = std::env::var("CATALOG_URL") {
            catalog.base_url = url;
        }
        if let Ok(url) = std::env::var("ORDER_URL") {
            orders.base_url = url;
        }
        if let Ok(key) = std::env::var("ORDER_API_KEY") {
            orders.api_key = key;
        }
        if let Some(timeout) = env_parse::<u64>("UPSTREAM_TIMEOUT_MS").map(Duration::from_millis) {
            catalog.timeout = timeout;
            orders.timeout = timeout;
        }
        if let Some(attempts) = env_parse::<u32>("UPSTREAM_RETRY_MAX_ATTEMPTS") {
            catalog.retry.max_attempts = attempts;
            orders.retry.max_attempts = attempts;
        }

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_parse("PORT").unwrap_or(5000),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            catalog,
            orders,
        }
    }

    /// The `host:port` string the listener binds.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            log_level: "info".to_string(),
            catalog: CatalogConfig::default(),
            orders: OrderConfig::default(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|value| value.parse().ok())
}
