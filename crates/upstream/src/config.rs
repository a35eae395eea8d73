//! Connection settings for the two upstream services.

use std::time::Duration;

use crate::retry::RetryPolicy;

/// Default timeout applied to every upstream call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for the catalog/inventory service client.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL of the catalog service, without a trailing slash.
    pub base_url: String,
    /// Per-call timeout.
    pub timeout: Duration,
    /// Retry policy for idempotent calls.
    pub retry: RetryPolicy,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5001".to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

/// Settings for the order service client.
#[derive(Debug, Clone)]
pub struct OrderConfig {
    /// Base URL of the order service, without a trailing slash.
    pub base_url: String,
    /// Shared secret sent in the `x-secret-key` header.
    pub api_key: String,
    /// Per-call timeout.
    pub timeout: Duration,
    /// Retry policy for idempotent calls.
    pub retry: RetryPolicy,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5002".to_string(),
            api_key: "dev-secret-key".to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}
