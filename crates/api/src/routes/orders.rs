//! Order lookup endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use domain::OrderRecord;
use saga::{CatalogService, OrderService};
use serde::Serialize;

use crate::error::ApiError;
use crate::routes::checkout::AppState;

#[derive(Serialize)]
pub struct CustomerOrdersResponse {
    pub success: bool,
    pub data: Vec<OrderRecord>,
}

/// GET /orders/{customer_name} — orders belonging to one customer.
///
/// The order service has no per-customer query, so the full listing is
/// fetched and filtered here. An unknown customer gets an empty list; an
/// upstream failure gets an error, never a silently empty list.
#[tracing::instrument(skip(state))]
pub async fn by_customer<C, O>(
    State(state): State<Arc<AppState<C, O>>>,
    Path(customer_name): Path<String>,
) -> Result<Json<CustomerOrdersResponse>, ApiError>
where
    C: CatalogService,
    O: OrderService,
{
    let data = state
        .coordinator
        .customer_orders(&customer_name)
        .await
        .map_err(ApiError::Lookup)?;

    Ok(Json(CustomerOrdersResponse {
        success: true,
        data,
    }))
}
