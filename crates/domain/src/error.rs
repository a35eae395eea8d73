//! Domain error types.

use thiserror::Error;

use crate::value_objects::ProductId;

/// Errors raised while validating a checkout request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// No bearer credential was supplied with the request.
    #[error("missing bearer credential")]
    MissingCredential,

    /// The customer name was absent or blank.
    #[error("customer name is required")]
    MissingCustomerName,

    /// The cart contained no items.
    #[error("cart must contain at least one item")]
    EmptyCart,

    /// A cart line was missing its product ID.
    #[error("every cart item needs a product id")]
    MissingProductId,

    /// A cart line carried a quantity outside the accepted range.
    #[error("invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: ProductId, quantity: u32 },
}

/// Convenience result alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
