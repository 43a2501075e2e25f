//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cart_store::StoreError;
use domain::{CartError, DomainError};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// The request violated one or more cart rules.
    Rejected(Vec<CartError>),
    /// The cart was modified concurrently; the client should retry.
    Conflict(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Missing or malformed customer identity.
    Unauthorized(String),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, messages) = match self {
            ApiError::Rejected(errors) => (rejection_status(&errors), render_messages(&errors)),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, vec![msg]),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, vec![msg]),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, vec![msg]),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, vec![msg])
            }
        };

        let body = serde_json::json!({ "messages": messages });
        (status, axum::Json(body)).into_response()
    }
}

/// A rejection where every violation is an absence reads as 404; any
/// other mix is the client's fault.
fn rejection_status(errors: &[CartError]) -> StatusCode {
    if !errors.is_empty() && errors.iter().all(CartError::is_not_found) {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::BAD_REQUEST
    }
}

fn render_messages(errors: &[CartError]) -> Vec<String> {
    errors.iter().map(ToString::to_string).collect()
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Rejected { errors } => ApiError::Rejected(errors),
            DomainError::Store(StoreError::ConcurrentModification { .. }) => {
                ApiError::Conflict("Cart was modified concurrently, please retry".to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}
