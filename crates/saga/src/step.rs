//! Ordered steps of the checkout saga.

use serde::Serialize;

/// The three forward steps of a checkout, in execution order.
///
/// Each step runs per item before the saga advances to the next step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SagaStep {
    /// Price lookup plus stock reservation against the catalog service.
    ReserveStock,
    /// Order creation against the order service.
    CreateOrder,
    /// Conversion of reservations into committed deductions.
    CommitStock,
}

impl SagaStep {
    /// Stable machine-readable name, as reported to callers and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            SagaStep::ReserveStock => "reserve_stock",
            SagaStep::CreateOrder => "create_order",
            SagaStep::CommitStock => "commit_stock",
        }
    }
}

impl std::fmt::Display for SagaStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
