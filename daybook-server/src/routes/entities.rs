//! CRUD endpoints shared by calendars and schedules.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use serde::Serialize;
use serde_json::Value;

use daybook_core::entity::EntityId;

use crate::db::Stored;
use crate::extract::UserId;
use crate::routes::AppError;
use crate::state::AppState;

pub fn router<E: Stored>() -> Router<AppState> {
    let base = format!("/{}", E::KIND.collection());

    Router::new()
        .route(&base, get(list::<E>).post(create::<E>))
        .route(&format!("{base}/bulk"), post(create_multiple::<E>))
        .route(&format!("{base}/bulk/multiple"), delete(delete_multiple::<E>))
        .route(&format!("{base}/{{id}}"), put(update::<E>).delete(remove::<E>))
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Decode one item of a create request, assigning an id when it has none.
fn decode_new<E: Stored>(mut value: Value) -> Result<E, AppError> {
    let Value::Object(fields) = &mut value else {
        return Err(AppError::BadRequest(format!("{} must be a JSON object", E::KIND)));
    };

    let has_id = fields
        .get("id")
        .is_some_and(|id| !id.is_null() && id.as_i64() != Some(0));
    if !has_id {
        fields.insert("id".to_string(), Value::from(EntityId::generate().value()));
    }

    serde_json::from_value(value)
        .map_err(|e| AppError::BadRequest(format!("Invalid {}: {e}", E::KIND)))
}

fn parse_id(raw: &str) -> Result<EntityId, AppError> {
    Ok(EntityId::parse(raw)?)
}

/// GET /{collection}
async fn list<E: Stored>(
    State(state): State<AppState>,
    UserId(user_id): UserId,
) -> Result<Json<Vec<E>>, AppError> {
    Ok(Json(state.db.list::<E>(&user_id)))
}

/// POST /{collection}
async fn create<E: Stored>(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<E>), AppError> {
    let Json(body) = payload.map_err(AppError::from_rejection)?;
    let entity = decode_new::<E>(body)?;

    let mut created = state.db.insert(&user_id, vec![entity])?;
    tracing::debug!(kind = %E::KIND, %user_id, "created");
    let entity = created
        .pop()
        .ok_or_else(|| anyhow::anyhow!("insert returned nothing"))?;
    Ok((StatusCode::CREATED, Json(entity)))
}

/// POST /{collection}/bulk with `{"<collection>": [...]}`
async fn create_multiple<E: Stored>(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<E>>), AppError> {
    let Json(mut body) = payload.map_err(AppError::from_rejection)?;
    let collection = E::KIND.collection();

    let Some(Value::Array(items)) = body.get_mut(collection).map(Value::take) else {
        return Err(AppError::BadRequest(format!("{collection} must be an array")));
    };
    let entities = items
        .into_iter()
        .map(decode_new::<E>)
        .collect::<Result<Vec<E>, _>>()?;

    let created = state.db.insert(&user_id, entities)?;
    tracing::debug!(kind = %E::KIND, %user_id, count = created.len(), "bulk created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /{collection}/{id}
async fn update<E: Stored>(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<E>, AppError> {
    let id = parse_id(&id)?;
    let Json(patch) = payload.map_err(AppError::from_rejection)?;

    state
        .db
        .update::<E>(&user_id, id, patch)?
        .map(Json)
        .ok_or_else(not_found::<E>)
}

/// DELETE /{collection}/{id}
async fn remove<E: Stored>(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&id)?;

    if !state.db.delete::<E>(&user_id, id)? {
        return Err(not_found::<E>());
    }
    Ok(Json(MessageResponse {
        message: format!("{} deleted successfully", capitalized::<E>()),
    }))
}

/// DELETE /{collection}/bulk/multiple with `{"ids": [...]}`
async fn delete_multiple<E: Stored>(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(body) = payload.map_err(AppError::from_rejection)?;

    let Some(Value::Array(raw_ids)) = body.get("ids") else {
        return Err(AppError::BadRequest("ids must be an array".into()));
    };
    // Ids may arrive as numbers or numeric strings
    let ids = raw_ids
        .iter()
        .map(|id| match id {
            Value::String(s) => parse_id(s),
            other => parse_id(&other.to_string()),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let deleted = state.db.delete_many::<E>(&user_id, &ids)?;
    Ok(Json(MessageResponse {
        message: format!("{deleted} {} deleted successfully", E::KIND.collection()),
    }))
}

fn capitalized<E: Stored>() -> String {
    let kind = E::KIND.to_string();
    let mut chars = kind.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => kind,
    }
}

fn not_found<E: Stored>() -> AppError {
    AppError::NotFound(format!("{} not found", capitalized::<E>()))
}
