//! Order service trait and in-memory implementation.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use domain::{Money, OrderId, OrderRecord, PricedItem, ProductId};
use serde::Serialize;

use crate::error::UpstreamError;

/// Payload for creating one order with the order service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOrder {
    pub customer_name: String,
    pub product_id: ProductId,
    pub quantity: u32,
    pub total_price: Money,
}

impl NewOrder {
    /// Builds the payload for one priced cart line.
    pub fn from_item(customer_name: &str, item: &PricedItem) -> Self {
        Self {
            customer_name: customer_name.to_string(),
            product_id: item.product_id.clone(),
            quantity: item.quantity,
            total_price: item.line_total,
        }
    }
}

/// Trait for the order service that persists orders.
///
/// Calls authenticate with a service-level secret, not the caller's
/// credential; the concrete implementation owns that secret.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Creates an order and returns its identifier.
    ///
    /// `Ok(None)` means the service accepted the order but its response
    /// carried no usable `order_id`; callers skip such orders from the
    /// result set rather than failing.
    async fn create_order(&self, order: NewOrder) -> Result<Option<OrderId>, UpstreamError>;

    /// Fetches every order the service knows about. Idempotent.
    async fn list_orders(&self) -> Result<Vec<OrderRecord>, UpstreamError>;
}

#[derive(Debug, Default)]
struct InMemoryOrderState {
    orders: Vec<(OrderId, NewOrder)>,
    next_id: u32,
    fail_after: Option<usize>,
    no_id_for: HashSet<ProductId>,
    fail_on_list: bool,
    create_calls: u32,
    list_calls: u32,
}

/// In-memory order service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderService {
    state: Arc<RwLock<InMemoryOrderState>>,
}

impl InMemoryOrderService {
    /// Creates a new in-memory order service with no orders.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures order creation to fail once `count` orders exist.
    ///
    /// `set_fail_after(0)` fails the first creation, `set_fail_after(2)`
    /// the third, and so on.
    pub fn set_fail_after(&self, count: usize) {
        self.state.write().unwrap().fail_after = Some(count);
    }

    /// Configures creations for this product to succeed without
    /// returning an order ID.
    pub fn set_no_id_for(&self, product_id: impl Into<ProductId>) {
        self.state
            .write()
            .unwrap()
            .no_id_for
            .insert(product_id.into());
    }

    /// Configures the listing call to fail.
    pub fn set_fail_on_list(&self, fail: bool) {
        self.state.write().unwrap().fail_on_list = fail;
    }

    /// Number of orders the service holds.
    pub fn order_count(&self) -> usize {
        self.state.read().unwrap().orders.len()
    }

    /// Number of creation calls made.
    pub fn create_calls(&self) -> u32 {
        self.state.read().unwrap().create_calls
    }

    /// Number of listing calls made.
    pub fn list_calls(&self) -> u32 {
        self.state.read().unwrap().list_calls
    }

    /// Total calls of any kind made against the order service.
    pub fn total_calls(&self) -> u32 {
        let state = self.state.read().unwrap();
        state.create_calls + state.list_calls
    }
}

#[async_trait]
impl OrderService for InMemoryOrderService {
    async fn create_order(&self, order: NewOrder) -> Result<Option<OrderId>, UpstreamError> {
        let mut state = self.state.write().unwrap();
        state.create_calls += 1;

        if state.fail_after == Some(state.orders.len()) {
            return Err(UpstreamError::rejected(500, "order creation failed"));
        }

        state.next_id += 1;
        let order_id = OrderId::new(state.next_id.to_string());
        let anonymous = state.no_id_for.contains(&order.product_id);
        state.orders.push((order_id.clone(), order));

        if anonymous {
            Ok(None)
        } else {
            Ok(Some(order_id))
        }
    }

    async fn list_orders(&self) -> Result<Vec<OrderRecord>, UpstreamError> {
        let mut state = self.state.write().unwrap();
        state.list_calls += 1;

        if state.fail_on_list {
            return Err(UpstreamError::unavailable("order service timed out"));
        }

        let records = state
            .orders
            .iter()
            .map(|(order_id, order)| OrderRecord {
                order_id: Some(order_id.clone()),
                customer_name: Some(order.customer_name.clone()),
                product_id: Some(order.product_id.clone()),
                quantity: Some(order.quantity),
                total_price: Some(order.total_price),
                extra: serde_json::Map::new(),
            })
            .collect();
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn order_for(product: &str) -> NewOrder {
        NewOrder {
            customer_name: "Maria Garcia".to_string(),
            product_id: ProductId::new(product),
            quantity: 1,
            total_price: Money::new(dec!(99.5)),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let service = InMemoryOrderService::new();

        let first = service.create_order(order_for("PRD-001")).await.unwrap();
        let second = service.create_order(order_for("PRD-002")).await.unwrap();

        assert_eq!(first, Some(OrderId::new("1")));
        assert_eq!(second, Some(OrderId::new("2")));
        assert_eq!(service.order_count(), 2);
    }

    #[tokio::test]
    async fn test_fail_after_threshold() {
        let service = InMemoryOrderService::new();
        service.set_fail_after(1);

        assert!(service.create_order(order_for("PRD-001")).await.is_ok());
        assert!(service.create_order(order_for("PRD-002")).await.is_err());
        assert_eq!(service.order_count(), 1);
    }

    #[tokio::test]
    async fn test_no_id_order_is_stored_but_anonymous() {
        let service = InMemoryOrderService::new();
        service.set_no_id_for("PRD-001");

        let id = service.create_order(order_for("PRD-001")).await.unwrap();
        assert_eq!(id, None);
        assert_eq!(service.order_count(), 1);
    }

    #[tokio::test]
    async fn test_listing_reflects_created_orders() {
        let service = InMemoryOrderService::new();
        service.create_order(order_for("PRD-001")).await.unwrap();

        let records = service.list_orders().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].customer_name.as_deref(), Some("Maria Garcia"));
        assert_eq!(records[0].order_id, Some(OrderId::new("1")));
    }

    #[tokio::test]
    async fn test_fail_on_list() {
        let service = InMemoryOrderService::new();
        service.set_fail_on_list(true);

        let result = service.list_orders().await;
        assert!(matches!(result, Err(UpstreamError::Unavailable { .. })));
    }
}
