//! Saga pattern implementation for checkout orchestration.
//!
//! This crate drives a distributed checkout across two independently
//! owned services without a shared transaction. The saga follows these
//! steps, each executed per item in strict list order:
//! 1. Reserve stock (price lookup + reservation against the catalog)
//! 2. Create order (persistence in the order service)
//! 3. Commit stock (finalize the reservations)
//!
//! If a step fails, reservations still held are released in reverse
//! order on a best-effort basis. Committing is the point of no return:
//! once any item's stock is committed, its order stands.

pub mod coordinator;
pub mod error;
pub mod services;
pub mod step;

pub use coordinator::{CheckoutReceipt, SagaCoordinator};
pub use error::{CompensationReport, PartialFailure, SagaError, UpstreamError};
pub use services::{
    CatalogService, InMemoryCatalogService, InMemoryOrderService, NewOrder, OrderService,
};
pub use step::SagaStep;
