//! Holiday calendar proxy

use anyhow::{Context, anyhow};
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde_json::Value;
use url::Url;

use crate::config::HolidayConfig;
use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/holiday", get(default_region))
        .route("/holiday/{region}", get(by_region))
}

/// GET /holiday - Holidays of the configured default region
async fn default_region(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let region = state.config.holiday.default_region.clone();
    fetch_events(&state, &region).await.map(Json)
}

/// GET /holiday/:region - Holidays of one region, e.g. `en.usa`
async fn by_region(
    State(state): State<AppState>,
    Path(region): Path<String>,
) -> Result<Json<Value>, AppError> {
    fetch_events(&state, &region).await.map(Json)
}

/// `{api_url}/calendars/{region}#{calendar_id}/events?key={api_key}`
fn events_url(config: &HolidayConfig, region: &str) -> anyhow::Result<Url> {
    let mut url = Url::parse(&config.api_url)
        .with_context(|| format!("Invalid holiday API URL '{}'", config.api_url))?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("Invalid holiday API URL '{}'", config.api_url))?
        .pop_if_empty()
        .push("calendars")
        .push(&format!("{region}#{}", config.calendar_id))
        .push("events");
    url.query_pairs_mut().append_pair("key", &config.api_key);
    Ok(url)
}

async fn fetch_events(state: &AppState, region: &str) -> Result<Value, AppError> {
    let url = events_url(&state.config.holiday, region)?;

    let resp = state
        .http
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::Upstream(format!("Holiday API unreachable: {e}")))?;
    let status = resp.status();
    let body: Value = resp
        .json()
        .await
        .map_err(|e| AppError::Upstream(format!("Holiday API returned an invalid body: {e}")))?;

    if !status.is_success() {
        let message = body
            .pointer("/error/message")
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| format!("Holiday API responded with {status}"));
        return Err(AppError::Upstream(message));
    }

    tracing::debug!(%region, "fetched holiday events");
    Ok(body)
}
