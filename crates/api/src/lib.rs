//! HTTP API server with observability for the checkout orchestrator.
//!
//! Exposes the checkout saga and the per-customer order lookup over
//! REST, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use saga::{CatalogService, OrderService, SagaCoordinator, UpstreamError};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use upstream::{HttpCatalogClient, HttpOrderClient};

use config::Config;
use routes::checkout::AppState;

/// Creates the axum application router with all routes and shared state.
pub fn create_app<C, O>(state: Arc<AppState<C, O>>, metrics_handle: PrometheusHandle) -> Router
where
    C: CatalogService + 'static,
    O: OrderService + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/checkout", post(routes::checkout::submit::<C, O>))
        .route(
            "/orders/{customer_name}",
            get(routes::orders::by_customer::<C, O>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state over the HTTP-backed upstream clients.
pub fn create_http_state(
    config: &Config,
) -> Result<Arc<AppState<HttpCatalogClient, HttpOrderClient>>, UpstreamError> {
    let catalog = HttpCatalogClient::new(&config.catalog)?;
    let orders = HttpOrderClient::new(&config.orders)?;

    Ok(Arc::new(AppState {
        coordinator: SagaCoordinator::new(catalog, orders),
    }))
}
