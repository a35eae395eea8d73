//! External service traits and in-memory implementations for saga steps.

pub mod catalog;
pub mod orders;

pub use catalog::{CatalogService, InMemoryCatalogService};
pub use orders::{InMemoryOrderService, NewOrder, OrderService};
