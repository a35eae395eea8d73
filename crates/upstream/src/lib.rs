//! HTTP clients for the catalog and order services.
//!
//! These adapters implement the saga's service traits over the real
//! REST contracts:
//! - Catalog: `GET /catalog/products/{id}` plus the
//!   `/inventory/stock/{id}/{reserve,commit,release}` mutations,
//!   authenticated with the caller's bearer credential.
//! - Orders: `POST /orders` and `GET /orders`, authenticated with a
//!   service-level shared secret.
//!
//! Every call carries an explicit timeout. Idempotent reads retry
//! transient failures with exponential backoff; mutations never retry.

pub mod catalog;
pub mod config;
pub mod orders;
pub mod retry;

pub use catalog::HttpCatalogClient;
pub use config::{CatalogConfig, DEFAULT_TIMEOUT, OrderConfig};
pub use orders::HttpOrderClient;
pub use retry::{Backoff, RetryPolicy};

use saga::UpstreamError;

/// Maps a non-2xx response to `Rejected`, passing 2xx through.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let detail = response.text().await.unwrap_or_default();
    let detail = if detail.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("upstream error")
            .to_string()
    } else {
        detail
    };
    Err(UpstreamError::rejected(status.as_u16(), detail))
}
