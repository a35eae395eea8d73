//! Checkout request model and validation.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{BearerToken, Money, ProductId};

/// Largest quantity accepted for a single cart line.
pub const MAX_LINE_QUANTITY: u32 = 10_000;

/// One line of a checkout cart: a product and how many units to buy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl CartItem {
    /// Creates a cart line.
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }

    /// Attaches the unit price looked up from the catalog, producing the
    /// priced form used for order creation.
    pub fn priced(self, unit_price: Money) -> PricedItem {
        let line_total = unit_price.multiply(self.quantity);
        PricedItem {
            product_id: self.product_id,
            quantity: self.quantity,
            unit_price,
            line_total,
        }
    }
}

/// A cart line with its catalog price attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricedItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
    pub line_total: Money,
}

/// A validated checkout request ready for orchestration.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub customer_name: String,
    pub items: Vec<CartItem>,
    pub credential: Option<BearerToken>,
}

impl CheckoutRequest {
    /// Checks the structural rules a request must satisfy before any
    /// upstream call is made.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.credential.is_none() {
            return Err(DomainError::MissingCredential);
        }

        if self.customer_name.trim().is_empty() {
            return Err(DomainError::MissingCustomerName);
        }

        if self.items.is_empty() {
            return Err(DomainError::EmptyCart);
        }

        for item in &self.items {
            if item.product_id.as_str().trim().is_empty() {
                return Err(DomainError::MissingProductId);
            }
            if item.quantity == 0 || item.quantity > MAX_LINE_QUANTITY {
                return Err(DomainError::InvalidQuantity {
                    product_id: item.product_id.clone(),
                    quantity: item.quantity,
                });
            }
        }

        Ok(())
    }

    /// Returns the caller credential, or an error when it is absent.
    pub fn credential(&self) -> Result<&BearerToken, DomainError> {
        self.credential
            .as_ref()
            .ok_or(DomainError::MissingCredential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn valid_request() -> CheckoutRequest {
        CheckoutRequest {
            customer_name: "Maria Garcia".to_string(),
            items: vec![CartItem::new("PRD-001", 2)],
            credential: Some(BearerToken::new("token-1")),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_missing_credential_rejected() {
        let mut request = valid_request();
        request.credential = None;
        assert_eq!(request.validate(), Err(DomainError::MissingCredential));
    }

    #[test]
    fn test_blank_customer_name_rejected() {
        let mut request = valid_request();
        request.customer_name = "   ".to_string();
        assert_eq!(request.validate(), Err(DomainError::MissingCustomerName));
    }

    #[test]
    fn test_empty_cart_rejected() {
        let mut request = valid_request();
        request.items.clear();
        assert_eq!(request.validate(), Err(DomainError::EmptyCart));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut request = valid_request();
        request.items.push(CartItem::new("PRD-002", 0));
        assert_eq!(
            request.validate(),
            Err(DomainError::InvalidQuantity {
                product_id: ProductId::new("PRD-002"),
                quantity: 0,
            })
        );
    }

    #[test]
    fn test_oversized_quantity_rejected() {
        let mut request = valid_request();
        request.items[0].quantity = MAX_LINE_QUANTITY + 1;
        assert!(matches!(
            request.validate(),
            Err(DomainError::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn test_blank_product_id_rejected() {
        let mut request = valid_request();
        request.items[0].product_id = ProductId::new("  ");
        assert_eq!(request.validate(), Err(DomainError::MissingProductId));
    }

    #[test]
    fn test_pricing_a_line_computes_total() {
        let priced = CartItem::new("PRD-001", 3).priced(Money::new(dec!(150000)));
        assert_eq!(priced.unit_price.amount(), dec!(150000));
        assert_eq!(priced.line_total.amount(), dec!(450000));
    }
}
