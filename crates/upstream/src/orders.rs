//! Order service HTTP client.

use async_trait::async_trait;
use domain::{OrderId, OrderRecord};
use saga::{NewOrder, OrderService, UpstreamError};
use serde::Deserialize;

use crate::check_status;
use crate::config::OrderConfig;
use crate::retry::{Backoff, RetryPolicy};

/// Header carrying the service-to-service shared secret.
const SECRET_HEADER: &str = "x-secret-key";

/// HTTP adapter for the order service.
///
/// Authenticates every call with the shared secret from its config,
/// independent of whatever credential the end customer presented.
#[derive(Debug, Clone)]
pub struct HttpOrderClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    retry: RetryPolicy,
}

impl HttpOrderClient {
    /// Creates a client from the given settings.
    ///
    /// Fails only when the underlying HTTP client cannot be built.
    pub fn new(config: &OrderConfig) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| UpstreamError::unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            retry: config.retry.clone(),
        })
    }

    async fn try_list_orders(&self) -> Result<Vec<OrderRecord>, UpstreamError> {
        let url = format!("{}/orders", self.base_url);

        let response = self
            .client
            .get(&url)
            .header(SECRET_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| UpstreamError::unavailable(e.to_string()))?;

        let response = check_status(response).await?;
        let body: OrdersListResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::decode(e.to_string()))?;
        Ok(body.data)
    }
}

#[async_trait]
impl OrderService for HttpOrderClient {
    async fn create_order(&self, order: NewOrder) -> Result<Option<OrderId>, UpstreamError> {
        let url = format!("{}/orders", self.base_url);

        let response = self
            .client
            .post(&url)
            .header(SECRET_HEADER, &self.api_key)
            .json(&order)
            .send()
            .await
            .map_err(|e| UpstreamError::unavailable(e.to_string()))?;

        let response = check_status(response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::unavailable(e.to_string()))?;

        // The order exists upstream once the call succeeded. A response
        // without a readable `order_id` drops only the invoice, never
        // the order.
        match serde_json::from_slice::<CreateOrderResponse>(&bytes) {
            Ok(body) => Ok(body.order_id),
            Err(error) => {
                tracing::warn!(
                    %error,
                    "undecodable order creation response, treating as missing order id"
                );
                Ok(None)
            }
        }
    }

    async fn list_orders(&self) -> Result<Vec<OrderRecord>, UpstreamError> {
        let mut backoff = Backoff::new(&self.retry);
        loop {
            match self.try_list_orders().await {
                Ok(orders) => return Ok(orders),
                Err(error) if error.is_transient() => {
                    let Some(delay) = backoff.next_delay() else {
                        return Err(error);
                    };
                    tracing::debug!(
                        %error,
                        attempt = backoff.current_attempt(),
                        "retrying order listing"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

// API response types

#[derive(Debug, Deserialize)]
struct CreateOrderResponse {
    #[serde(default)]
    order_id: Option<OrderId>,
}

#[derive(Debug, Deserialize)]
struct OrdersListResponse {
    data: Vec<OrderRecord>,
}
