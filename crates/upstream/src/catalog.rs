//! Catalog/inventory service HTTP client.

use async_trait::async_trait;
use domain::{BearerToken, Money, ProductId};
use saga::{CatalogService, UpstreamError};
use serde::{Deserialize, Serialize};

use crate::check_status;
use crate::config::CatalogConfig;
use crate::retry::{Backoff, RetryPolicy};

/// HTTP adapter for the catalog/inventory service.
///
/// Implements `CatalogService` over the catalog's REST API. Price
/// fetches are idempotent and retry transient failures per the
/// configured policy; the stock mutations never retry.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl HttpCatalogClient {
    /// Creates a client from the given settings.
    ///
    /// Fails only when the underlying HTTP client cannot be built.
    pub fn new(config: &CatalogConfig) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| UpstreamError::unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry: config.retry.clone(),
        })
    }

    async fn try_fetch_price(
        &self,
        product_id: &ProductId,
        credential: &BearerToken,
    ) -> Result<Money, UpstreamError> {
        let url = format!("{}/catalog/products/{}", self.base_url, product_id);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, credential.header_value())
            .send()
            .await
            .map_err(|e| UpstreamError::unavailable(e.to_string()))?;

        let response = check_status(response).await?;
        let body: ProductResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::decode(e.to_string()))?;
        Ok(body.data.retail_price)
    }

    async fn post_stock(
        &self,
        action: &str,
        product_id: &ProductId,
        quantity: u32,
        credential: &BearerToken,
    ) -> Result<(), UpstreamError> {
        let url = format!("{}/inventory/stock/{}/{}", self.base_url, product_id, action);

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, credential.header_value())
            .json(&QuantityBody { quantity })
            .send()
            .await
            .map_err(|e| UpstreamError::unavailable(e.to_string()))?;

        check_status(response).await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogService for HttpCatalogClient {
    async fn fetch_price(
        &self,
        product_id: &ProductId,
        credential: &BearerToken,
    ) -> Result<Money, UpstreamError> {
        let mut backoff = Backoff::new(&self.retry);
        loop {
            match self.try_fetch_price(product_id, credential).await {
                Ok(price) => return Ok(price),
                Err(error) if error.is_transient() => {
                    let Some(delay) = backoff.next_delay() else {
                        return Err(error);
                    };
                    tracing::debug!(
                        %product_id,
                        %error,
                        attempt = backoff.current_attempt(),
                        "retrying price fetch"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(error) => return Err(error),
            }
        }
    }

    async fn reserve_stock(
        &self,
        product_id: &ProductId,
        quantity: u32,
        credential: &BearerToken,
    ) -> Result<(), UpstreamError> {
        self.post_stock("reserve", product_id, quantity, credential)
            .await
    }

    async fn commit_stock(
        &self,
        product_id: &ProductId,
        quantity: u32,
        credential: &BearerToken,
    ) -> Result<(), UpstreamError> {
        self.post_stock("commit", product_id, quantity, credential)
            .await
    }

    async fn release_stock(
        &self,
        product_id: &ProductId,
        quantity: u32,
        credential: &BearerToken,
    ) -> Result<(), UpstreamError> {
        self.post_stock("release", product_id, quantity, credential)
            .await
    }
}

// API request/response types

#[derive(Debug, Serialize)]
struct QuantityBody {
    quantity: u32,
}

#[derive(Debug, Deserialize)]
struct ProductResponse {
    data: ProductData,
}

#[derive(Debug, Deserialize)]
struct ProductData {
    retail_price: Money,
}
