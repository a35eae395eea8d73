//! Order records as returned by the order service listing.

use serde::{Deserialize, Serialize};

use crate::value_objects::{Money, OrderId, ProductId};

/// One order as the order service reports it.
///
/// The listing endpoint is owned by another team, so only the fields the
/// orchestrator reasons about are typed here. Everything else rides along
/// in `extra` and is echoed back to callers untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price: Option<Money>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl OrderRecord {
    /// Exact match on the record's customer name.
    ///
    /// Records without a customer name never match.
    pub fn belongs_to(&self, customer_name: &str) -> bool {
        self.customer_name.as_deref() == Some(customer_name)
    }
}
