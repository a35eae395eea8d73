//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::OrderId;
use saga::{CompensationReport, PartialFailure, SagaError, SagaStep, UpstreamError};
use serde::Serialize;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Checkout saga failure.
    Saga(SagaError),
    /// Order lookup failure.
    Lookup(UpstreamError),
}

/// Failure body returned to clients.
///
/// `message` is always a generic English sentence; raw upstream response
/// bodies are logged server-side and never forwarded. The optional
/// fields carry the machine-readable abort detail operators need.
#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    step: Option<SagaStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_ids: Option<Vec<OrderId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    compensation: Option<CompensationReport>,
}

impl ErrorBody {
    fn new(message: impl Into<String>, error: &'static str) -> Self {
        Self {
            success: false,
            message: message.into(),
            error,
            step: None,
            order_ids: None,
            compensation: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Saga(err) => saga_error_to_response(err),
            ApiError::Lookup(err) => lookup_error_to_response(err),
        };

        (status, axum::Json(body)).into_response()
    }
}

fn saga_error_to_response(err: SagaError) -> (StatusCode, ErrorBody) {
    match err {
        SagaError::Unauthenticated => (
            StatusCode::UNAUTHORIZED,
            ErrorBody::new("missing or invalid bearer credential", "unauthenticated"),
        ),
        SagaError::InvalidRequest(source) => (
            StatusCode::BAD_REQUEST,
            ErrorBody::new(source.to_string(), "invalid_request"),
        ),
        SagaError::Upstream {
            step,
            source,
            compensation,
        } => {
            tracing::warn!(step = %step, error = %source, "checkout aborted by upstream failure");
            let (status, kind) = upstream_status(&source);
            let mut body = ErrorBody::new("checkout could not be completed", kind);
            body.step = Some(step);
            if compensation.attempted() > 0 {
                body.compensation = Some(compensation);
            }
            (status, body)
        }
        SagaError::Partial(partial) => {
            let PartialFailure {
                step,
                order_ids,
                source,
                compensation,
            } = partial;
            tracing::error!(
                step = %step,
                orders_created = order_ids.len(),
                error = %source,
                "checkout left orders behind, manual review required"
            );
            let mut body = ErrorBody::new(
                "checkout failed after orders were created; the listed orders need review",
                "partial_failure",
            );
            body.step = Some(step);
            body.order_ids = Some(order_ids);
            body.compensation = Some(compensation);
            (StatusCode::BAD_GATEWAY, body)
        }
    }
}

fn upstream_status(source: &UpstreamError) -> (StatusCode, &'static str) {
    match source {
        UpstreamError::Rejected { .. } => (StatusCode::CONFLICT, "upstream_rejected"),
        UpstreamError::Unavailable { .. } => (StatusCode::BAD_GATEWAY, "upstream_unavailable"),
        UpstreamError::Decode { .. } => (StatusCode::BAD_GATEWAY, "upstream_decode"),
    }
}

fn lookup_error_to_response(err: UpstreamError) -> (StatusCode, ErrorBody) {
    tracing::warn!(error = %err, "order lookup failed");
    (
        StatusCode::BAD_GATEWAY,
        ErrorBody::new("order lookup is currently unavailable", "lookup_failed"),
    )
}

impl From<SagaError> for ApiError {
    fn from(err: SagaError) -> Self {
        ApiError::Saga(err)
    }
}
