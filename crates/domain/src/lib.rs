//! Domain layer for the checkout orchestrator.
//!
//! This crate provides the checkout cart model and its supporting
//! value objects:
//! - CheckoutRequest with structural validation
//! - CartItem and its priced counterpart
//! - Money, ProductId, OrderId, Invoice and BearerToken value objects
//! - OrderRecord mirror of the order service listing

pub mod checkout;
pub mod error;
pub mod record;
pub mod value_objects;

pub use checkout::{CartItem, CheckoutRequest, PricedItem, MAX_LINE_QUANTITY};
pub use error::{DomainError, DomainResult};
pub use record::OrderRecord;
pub use value_objects::{BearerToken, Invoice, Money, OrderId, ProductId};
