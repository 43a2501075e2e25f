//! Customer identity extraction from request headers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::CustomerId;

use crate::error::ApiError;

/// Header carrying the authenticated customer's id.
pub const CUSTOMER_ID_HEADER: &str = "x-customer-id";

/// The customer a request acts on behalf of.
///
/// Extracted from the `x-customer-id` header; a missing or malformed
/// header rejects the request before any handler runs. Upstream
/// authentication is assumed to have populated the header.
#[derive(Debug, Clone, Copy)]
pub struct CustomerIdentity(pub CustomerId);

impl<S> FromRequestParts<S> for CustomerIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(CUSTOMER_ID_HEADER)
            .ok_or_else(|| {
                ApiError::Unauthorized(format!("Missing {CUSTOMER_ID_HEADER} header"))
            })?
            .to_str()
            .map_err(|_| {
                ApiError::Unauthorized(format!("Invalid {CUSTOMER_ID_HEADER} header"))
            })?;

        let uuid = uuid::Uuid::parse_str(value).map_err(|e| {
            ApiError::Unauthorized(format!("Invalid {CUSTOMER_ID_HEADER} header: {e}"))
        })?;

        Ok(CustomerIdentity(CustomerId::from_uuid(uuid)))
    }
}
