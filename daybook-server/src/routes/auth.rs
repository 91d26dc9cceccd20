//! Authentication endpoints

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use serde::Serialize;

use daybook_core::remote::{User, UserProfile};

use crate::extract::UserId;
use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth", post(create_or_get_user))
        .route("/auth/me", get(me))
}

#[derive(Serialize)]
pub struct UserResponse {
    pub user: User,
}

/// POST /auth - Record the profile of a user signed in with the identity provider
async fn create_or_get_user(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    payload: Result<Json<UserProfile>, JsonRejection>,
) -> Result<Json<UserResponse>, AppError> {
    let Json(profile) = payload.map_err(AppError::from_rejection)?;

    let user = state.db.upsert_user(&user_id, profile)?;
    tracing::info!(%user_id, "user signed in");
    Ok(Json(UserResponse { user }))
}

/// GET /auth/me
async fn me(
    State(state): State<AppState>,
    UserId(user_id): UserId,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .db
        .user(&user_id)
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(Json(UserResponse { user }))
}
