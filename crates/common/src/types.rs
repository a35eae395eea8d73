//! Identifier types shared by the orchestrator crates.

use serde::Serialize;
use uuid::Uuid;

/// Correlation identifier for one checkout saga run.
///
/// Minted when a checkout is accepted and threaded through every log
/// line and the final receipt, so one run can be traced end to end.
/// The orchestrator keeps no state between runs; the ID is never
/// looked up again and only has to be unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CheckoutId(Uuid);

impl CheckoutId {
    /// Mints a fresh random checkout ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CheckoutId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CheckoutId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
