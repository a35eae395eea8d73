//! Saga error types.

use domain::{DomainError, OrderId, ProductId};
use serde::Serialize;
use thiserror::Error;

use crate::step::SagaStep;

/// Failure of a single call to an upstream service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// The service could not be reached or did not answer in time.
    #[error("upstream unavailable: {detail}")]
    Unavailable { detail: String },

    /// The service answered with a non-2xx business error.
    #[error("upstream rejected the call (status {status}): {detail}")]
    Rejected { status: u16, detail: String },

    /// The service answered 2xx but the body was not what the contract says.
    #[error("could not decode upstream response: {detail}")]
    Decode { detail: String },
}

impl UpstreamError {
    /// Builds an `Unavailable` error.
    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self::Unavailable {
            detail: detail.into(),
        }
    }

    /// Builds a `Rejected` error from a status code and message.
    pub fn rejected(status: u16, detail: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            detail: detail.into(),
        }
    }

    /// Builds a `Decode` error.
    pub fn decode(detail: impl Into<String>) -> Self {
        Self::Decode {
            detail: detail.into(),
        }
    }

    /// True when retrying the same call could plausibly succeed.
    ///
    /// Connectivity problems, server-side 5xx answers, and 429
    /// rate-limit rejections qualify; other business rejections and
    /// contract mismatches are permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            UpstreamError::Unavailable { .. } => true,
            UpstreamError::Rejected { status, .. } => *status >= 500 || *status == 429,
            UpstreamError::Decode { .. } => false,
        }
    }
}

/// What happened when reserved stock was released after an abort.
///
/// Compensation is best-effort: a failed release is recorded here rather
/// than overriding the error that aborted the saga.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompensationReport {
    /// Products whose reservations were released.
    pub released: Vec<ProductId>,
    /// Products whose release call failed; their reservations may still
    /// be held upstream.
    pub leaked: Vec<ProductId>,
}

impl CompensationReport {
    /// True when every attempted release succeeded.
    pub fn is_clean(&self) -> bool {
        self.leaked.is_empty()
    }

    /// Number of release calls attempted.
    pub fn attempted(&self) -> usize {
        self.released.len() + self.leaked.len()
    }
}

/// A saga abort that left durable orders behind.
///
/// Carries everything an operator needs to reconcile by hand: which step
/// broke, the orders that already exist, and how compensation went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialFailure {
    /// The step whose call failed.
    pub step: SagaStep,
    /// Orders durably created before the abort, in creation order.
    pub order_ids: Vec<OrderId>,
    /// The upstream failure that aborted the saga.
    pub source: UpstreamError,
    /// Outcome of releasing the reservations still held.
    pub compensation: CompensationReport,
}

impl std::fmt::Display for PartialFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "checkout aborted at {} with {} order(s) already created: {}",
            self.step,
            self.order_ids.len(),
            self.source
        )
    }
}

/// Errors that can abort a checkout saga.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SagaError {
    /// No bearer credential accompanied the request; no upstream call
    /// was made.
    #[error("missing bearer credential")]
    Unauthenticated,

    /// The request failed structural validation; no upstream call was
    /// made.
    #[error("invalid checkout request: {0}")]
    InvalidRequest(DomainError),

    /// An upstream call failed before any order was created. All
    /// reservations were released on a best-effort basis.
    #[error("checkout step '{step}' failed: {source}")]
    Upstream {
        step: SagaStep,
        source: UpstreamError,
        compensation: CompensationReport,
    },

    /// An upstream call failed after orders were durably created.
    #[error("{0}")]
    Partial(PartialFailure),
}

impl SagaError {
    /// The step at which the saga aborted, when it got that far.
    pub fn step(&self) -> Option<SagaStep> {
        match self {
            SagaError::Upstream { step, .. } => Some(*step),
            SagaError::Partial(partial) => Some(partial.step),
            _ => None,
        }
    }
}

impl From<DomainError> for SagaError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::MissingCredential => SagaError::Unauthenticated,
            other => SagaError::InvalidRequest(other),
        }
    }
}
