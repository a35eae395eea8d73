//! Wire-level tests for the catalog and order service clients.

use std::time::Duration;

use domain::{BearerToken, Money, OrderId, ProductId};
use rust_decimal_macros::dec;
use saga::{CatalogService, NewOrder, OrderService, UpstreamError};
use serde_json::json;
use upstream::{CatalogConfig, HttpCatalogClient, HttpOrderClient, OrderConfig, RetryPolicy};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn catalog_config(server: &MockServer) -> CatalogConfig {
    CatalogConfig {
        base_url: server.uri(),
        timeout: Duration::from_secs(2),
        retry: RetryPolicy::none(),
    }
}

fn order_config(server: &MockServer) -> OrderConfig {
    OrderConfig {
        base_url: server.uri(),
        api_key: "test-secret".to_string(),
        timeout: Duration::from_secs(2),
        retry: RetryPolicy::none(),
    }
}

fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_backoff: Duration::from_millis(10),
        max_backoff: Duration::from_millis(50),
        backoff_multiplier: 2.0,
    }
}

fn token() -> BearerToken {
    BearerToken::new("tok-1")
}

fn new_order() -> NewOrder {
    NewOrder {
        customer_name: "Maria Garcia".to_string(),
        product_id: ProductId::new("PRD-001"),
        quantity: 2,
        total_price: Money::new(dec!(300000)),
    }
}

#[tokio::test]
async fn test_fetch_price_decodes_data_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/catalog/products/PRD-001"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"retail_price": 150000}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpCatalogClient::new(&catalog_config(&server)).unwrap();
    let price = client
        .fetch_price(&ProductId::new("PRD-001"), &token())
        .await
        .unwrap();

    assert_eq!(price.amount(), dec!(150000));
}

#[tokio::test]
async fn test_fetch_price_maps_non_2xx_to_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/catalog/products/PRD-404"))
        .respond_with(ResponseTemplate::new(404).set_body_string("product not found"))
        .mount(&server)
        .await;

    let client = HttpCatalogClient::new(&catalog_config(&server)).unwrap();
    let err = client
        .fetch_price(&ProductId::new("PRD-404"), &token())
        .await
        .unwrap_err();

    assert!(matches!(err, UpstreamError::Rejected { status: 404, .. }));
}

#[tokio::test]
async fn test_fetch_price_retries_transient_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/catalog/products/PRD-001"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/catalog/products/PRD-001"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"retail_price": 99.5}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut config = catalog_config(&server);
    config.retry = fast_retry(2);
    let client = HttpCatalogClient::new(&config).unwrap();

    let price = client
        .fetch_price(&ProductId::new("PRD-001"), &token())
        .await
        .unwrap();
    assert_eq!(price.amount(), dec!(99.5));
}

#[tokio::test]
async fn test_fetch_price_retries_rate_limited_responses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/catalog/products/PRD-001"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/catalog/products/PRD-001"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"retail_price": 150000}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut config = catalog_config(&server);
    config.retry = fast_retry(2);
    let client = HttpCatalogClient::new(&config).unwrap();

    let price = client
        .fetch_price(&ProductId::new("PRD-001"), &token())
        .await
        .unwrap();
    assert_eq!(price.amount(), dec!(150000));
}

#[tokio::test]
async fn test_fetch_price_gives_up_after_max_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/catalog/products/PRD-001"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let mut config = catalog_config(&server);
    config.retry = fast_retry(2);
    let client = HttpCatalogClient::new(&config).unwrap();

    let err = client
        .fetch_price(&ProductId::new("PRD-001"), &token())
        .await
        .unwrap_err();
    assert!(matches!(err, UpstreamError::Rejected { status: 503, .. }));
}

#[tokio::test]
async fn test_fetch_price_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/catalog/products/PRD-001"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": {"retail_price": 1}}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let mut config = catalog_config(&server);
    config.timeout = Duration::from_millis(50);
    let client = HttpCatalogClient::new(&config).unwrap();

    let err = client
        .fetch_price(&ProductId::new("PRD-001"), &token())
        .await
        .unwrap_err();
    assert!(matches!(err, UpstreamError::Unavailable { .. }));
}

#[tokio::test]
async fn test_reserve_posts_quantity_with_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/inventory/stock/PRD-001/reserve"))
        .and(header("authorization", "Bearer tok-1"))
        .and(body_json(json!({"quantity": 3})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpCatalogClient::new(&catalog_config(&server)).unwrap();
    client
        .reserve_stock(&ProductId::new("PRD-001"), 3, &token())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_stock_mutations_are_never_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/inventory/stock/PRD-001/reserve"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    // A generous retry policy must not apply to mutations.
    let mut config = catalog_config(&server);
    config.retry = fast_retry(5);
    let client = HttpCatalogClient::new(&config).unwrap();

    let err = client
        .reserve_stock(&ProductId::new("PRD-001"), 1, &token())
        .await
        .unwrap_err();
    assert!(matches!(err, UpstreamError::Rejected { status: 503, .. }));
}

#[tokio::test]
async fn test_release_hits_release_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/inventory/stock/PRD-002/release"))
        .and(body_json(json!({"quantity": 4})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpCatalogClient::new(&catalog_config(&server)).unwrap();
    client
        .release_stock(&ProductId::new("PRD-002"), 4, &token())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_create_order_sends_secret_and_returns_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(header("x-secret-key", "test-secret"))
        .and(body_json(json!({
            "customer_name": "Maria Garcia",
            "product_id": "PRD-001",
            "quantity": 2,
            "total_price": 300000.0
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"order_id": 17})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpOrderClient::new(&order_config(&server)).unwrap();
    let order_id = client.create_order(new_order()).await.unwrap();

    assert_eq!(order_id, Some(OrderId::new("17")));
}

#[tokio::test]
async fn test_create_order_accepts_string_ids() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"order_id": "ord-abc"})))
        .mount(&server)
        .await;

    let client = HttpOrderClient::new(&order_config(&server)).unwrap();
    let order_id = client.create_order(new_order()).await.unwrap();

    assert_eq!(order_id, Some(OrderId::new("ord-abc")));
}

#[tokio::test]
async fn test_create_order_without_id_is_lenient() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"status": "created"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(201).set_body_string("created"))
        .mount(&server)
        .await;

    let client = HttpOrderClient::new(&order_config(&server)).unwrap();

    // Missing field and non-JSON body both mean "no invoice", not an
    // error.
    assert_eq!(client.create_order(new_order()).await.unwrap(), None);
    assert_eq!(client.create_order(new_order()).await.unwrap(), None);
}

#[tokio::test]
async fn test_create_order_failure_is_rejected_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = order_config(&server);
    config.retry = fast_retry(5);
    let client = HttpOrderClient::new(&config).unwrap();

    let err = client.create_order(new_order()).await.unwrap_err();
    assert!(matches!(err, UpstreamError::Rejected { status: 500, .. }));
}

#[tokio::test]
async fn test_list_orders_decodes_and_preserves_extras() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orders"))
        .and(header("x-secret-key", "test-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {
                    "order_id": 1,
                    "customer_name": "Maria Garcia",
                    "product_id": "PRD-001",
                    "quantity": 2,
                    "total_price": 300000,
                    "status": "confirmed"
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpOrderClient::new(&order_config(&server)).unwrap();
    let orders = client.list_orders().await.unwrap();

    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order_id, Some(OrderId::new("1")));
    assert_eq!(orders[0].customer_name.as_deref(), Some("Maria Garcia"));
    assert_eq!(orders[0].extra["status"], json!("confirmed"));
}

#[tokio::test]
async fn test_list_orders_retries_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = order_config(&server);
    config.retry = fast_retry(2);
    let client = HttpOrderClient::new(&config).unwrap();

    let orders = client.list_orders().await.unwrap();
    assert!(orders.is_empty());
}
