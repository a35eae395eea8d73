//! Checkout endpoint driving the saga.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use common::CheckoutId;
use domain::{BearerToken, CartItem, CheckoutRequest, Invoice, Money};
use saga::{CatalogService, OrderService, SagaCoordinator};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<C: CatalogService, O: OrderService> {
    pub coordinator: SagaCoordinator<C, O>,
}

// -- Request types --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBody {
    pub customer_name: String,
    pub items: Vec<CartLineBody>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineBody {
    pub product_id: String,
    pub quantity: u32,
}

// -- Response types --

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub success: bool,
    pub invoices: Vec<Invoice>,
    pub checkout_id: CheckoutId,
    pub total: Money,
}

// -- Handlers --

/// POST /checkout — run the checkout saga for a submitted cart.
///
/// The caller's `Authorization` header is forwarded to catalog calls; a
/// bare token without the `Bearer ` prefix is accepted too.
#[tracing::instrument(skip(state, headers, body))]
pub async fn submit<C, O>(
    State(state): State<Arc<AppState<C, O>>>,
    headers: HeaderMap,
    Json(body): Json<CheckoutBody>,
) -> Result<Json<CheckoutResponse>, ApiError>
where
    C: CatalogService,
    O: OrderService,
{
    let credential = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(BearerToken::from_header);

    let items = body
        .items
        .into_iter()
        .map(|line| CartItem::new(line.product_id, line.quantity))
        .collect();

    let request = CheckoutRequest {
        customer_name: body.customer_name,
        items,
        credential,
    };

    let receipt = state.coordinator.execute(request).await?;

    Ok(Json(CheckoutResponse {
        success: true,
        invoices: receipt.invoices,
        checkout_id: receipt.checkout_id,
        total: receipt.total,
    }))
}
