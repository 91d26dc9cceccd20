//! Request extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use daybook_core::remote::USER_HEADER;

use crate::routes::AppError;

/// The caller's user id, taken from the `x-user-id` header.
///
/// Sign-in happens with an external identity provider; the server trusts
/// the forwarded id. Requests without one are rejected with 401.
#[derive(Debug, Clone)]
pub struct UserId(pub String);

impl<S: Send + Sync> FromRequestParts<S> for UserId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Unauthorized: User ID is required".into()))?;

        Ok(UserId(user_id.to_string()))
    }
}
