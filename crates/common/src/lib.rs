//! Shared types used across the checkout orchestrator crates.

pub mod types;

pub use types::CheckoutId;
