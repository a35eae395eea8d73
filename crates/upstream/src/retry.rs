//! Retry policy with exponential backoff for idempotent upstream calls.
//!
//! Only reads (price fetch, order listing) are ever retried; the
//! mutating reservation, order-creation and commit calls carry no
//! idempotency token upstream, so retrying them risks duplicate
//! effects.

use std::time::Duration;

/// Retry configuration for idempotent upstream calls.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum retry attempts after the initial call (default: 3).
    pub max_attempts: u32,
    /// Backoff before the first retry (default: 100ms).
    pub initial_backoff: Duration,
    /// Upper bound on any single backoff (default: 5s).
    pub max_backoff: Duration,
    /// Backoff multiplier for exponential growth (default: 2.0).
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 0,
            ..Self::default()
        }
    }

    /// Default policy with a different attempt count.
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }
}

/// Stateful backoff calculator for one request.
#[derive(Debug)]
pub struct Backoff {
    current_attempt: u32,
    max_attempts: u32,
    initial_backoff_ms: u64,
    max_backoff_ms: u64,
    backoff_multiplier: f64,
}

impl Backoff {
    /// Creates a calculator from a retry policy.
    pub fn new(policy: &RetryPolicy) -> Self {
        Self {
            current_attempt: 0,
            max_attempts: policy.max_attempts,
            initial_backoff_ms: policy.initial_backoff.as_millis() as u64,
            max_backoff_ms: policy.max_backoff.as_millis() as u64,
            backoff_multiplier: policy.backoff_multiplier,
        }
    }

    /// Next backoff duration, or `None` when attempts are exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.current_attempt >= self.max_attempts {
            return None;
        }

        let multiplier = self.backoff_multiplier.powi(self.current_attempt as i32);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let backoff_ms = (self.initial_backoff_ms as f64 * multiplier) as u64;
        let capped_ms = backoff_ms.min(self.max_backoff_ms);

        self.current_attempt += 1;
        Some(Duration::from_millis(capped_ms))
    }

    /// Attempts consumed so far.
    pub fn current_attempt(&self) -> u32 {
        self.current_attempt
    }
}
