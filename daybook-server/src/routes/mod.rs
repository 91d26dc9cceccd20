pub mod auth;
pub mod entities;
pub mod health;
pub mod holiday;

use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use daybook_core::CoreError;
use daybook_core::entity::{Calendar, Schedule};

use crate::state::AppState;

/// Everything mounted under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(entities::router::<Calendar>())
        .merge(entities::router::<Schedule>())
        .merge(holiday::router())
}

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub enum AppError {
    Unauthorized(String),
    BadRequest(String),
    NotFound(String),
    /// The holiday API could not be reached or refused the request.
    Upstream(String),
    Internal(anyhow::Error),
}

impl AppError {
    pub fn from_rejection(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Upstream(msg) => {
                tracing::warn!(error = %msg, "holiday upstream failed");
                (StatusCode::BAD_REQUEST, msg)
            }
            AppError::Internal(err) => match err.downcast_ref::<CoreError>() {
                Some(CoreError::Validation(msg)) => (StatusCode::BAD_REQUEST, msg.clone()),
                _ => {
                    tracing::error!(error = %err, "request failed");
                    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
                }
            },
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}
