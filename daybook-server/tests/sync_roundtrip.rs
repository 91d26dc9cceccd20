//! Core clients against a live server.

mod common;

use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

use daybook_core::CoreError;
use daybook_core::entity::{Calendar, ColorOption};
use daybook_core::holiday::{HolidaySource, HttpHolidaySource};
use daybook_core::remote::{AuthApi, Gateway, HttpGateway, UserProfile};
use daybook_server::build_app;
use daybook_server::config::HolidayConfig;
use daybook_server::db::Database;
use daybook_server::state::AppState;

use common::{USER, spawn_server, test_config};

async fn spawn_daybook(holiday: HolidayConfig) -> String {
    let config = daybook_server::config::ServerConfig {
        holiday,
        ..test_config()
    };
    let base = spawn_server(build_app(AppState::new(Database::in_memory(), config))).await;
    format!("{base}/api")
}

#[tokio::test]
async fn test_calendar_round_trip_keeps_color() {
    let api = spawn_daybook(HolidayConfig::default()).await;
    let gateway: HttpGateway<Calendar> = HttpGateway::new(reqwest::Client::new(), &api);

    let calendar = Calendar::new("Work", ColorOption::new("Tomato", "#d50000"));
    let created = gateway.create(USER, &calendar).unwrap().await.unwrap();
    assert_eq!(created, calendar);

    let listed = gateway.list(USER).unwrap().await.unwrap();
    assert_eq!(listed, vec![calendar.clone()]);
    assert_eq!(listed[0].color_option, ColorOption::new("Tomato", "#d50000"));

    let mut renamed = calendar.clone();
    renamed.name = "Office".to_string();
    let updated = gateway.update(USER, calendar.id, &renamed).unwrap().await.unwrap();
    assert_eq!(updated.name, "Office");

    gateway.delete(USER, calendar.id).unwrap().await.unwrap();
    let err = gateway.delete(USER, calendar.id).unwrap().await.unwrap_err();
    assert!(matches!(err, CoreError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_bulk_calls() {
    let api = spawn_daybook(HolidayConfig::default()).await;
    let gateway: HttpGateway<Calendar> = HttpGateway::new(reqwest::Client::new(), &api);

    let a = Calendar::new("A", ColorOption::default());
    let b = Calendar::new("B", ColorOption::default());
    let created = gateway
        .create_multiple(USER, &[a.clone(), b.clone()])
        .unwrap()
        .await
        .unwrap();
    assert_eq!(created.len(), 2);

    gateway.delete_multiple(USER, &[a.id, b.id]).unwrap().await.unwrap();
    assert!(gateway.list(USER).unwrap().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_auth_api() {
    let api = spawn_daybook(HolidayConfig::default()).await;
    let auth = AuthApi::new(reqwest::Client::new(), &api);

    let err = auth.me(USER).await.unwrap_err();
    assert!(matches!(err, CoreError::Status { status: 404, .. }));

    let profile = UserProfile {
        email: "alice@example.com".to_string(),
        name: Some("Alice".to_string()),
        photo_url: None,
    };
    let user = auth.create_or_get_user(USER, &profile).await.unwrap();
    assert_eq!(user.id, USER);
    assert_eq!(auth.me(USER).await.unwrap(), user);
}

type Seen = Arc<Mutex<Vec<(String, Option<String>)>>>;

/// A stand-in for the upstream events API that records what it was asked for.
async fn spawn_upstream(seen: Seen) -> String {
    let app = Router::new().route(
        "/calendars/{calendar}/events",
        get(
            move |Path(calendar): Path<String>, Query(query): Query<std::collections::HashMap<String, String>>| {
                let seen = seen.clone();
                async move {
                    let key = query.get("key").cloned();
                    seen.lock().unwrap().push((calendar.clone(), key.clone()));

                    if key.as_deref() != Some("test-key") {
                        let body = json!({ "error": { "code": 400, "message": "API key not valid" } });
                        return (StatusCode::BAD_REQUEST, Json(body));
                    }
                    let body: Value = json!({
                        "summary": "Holidays in Japan",
                        "timeZone": "Asia/Tokyo",
                        "items": [{
                            "summary": "New Year's Day",
                            "start": { "date": "2025-01-01" },
                            "organizer": { "displayName": "Holidays in Japan" }
                        }]
                    });
                    (StatusCode::OK, Json(body))
                }
            },
        ),
    );
    spawn_server(app).await
}

#[tokio::test]
async fn test_holiday_proxy() {
    let seen = Seen::default();
    let upstream = spawn_upstream(seen.clone()).await;
    let api = spawn_daybook(HolidayConfig {
        api_url: upstream,
        api_key: "test-key".to_string(),
        ..Default::default()
    })
    .await;

    let source = HttpHolidaySource::new(reqwest::Client::new(), &api);
    let calendar = source.fetch_by_region("ja.japanese").await.unwrap();

    assert_eq!(calendar.summary.as_deref(), Some("Holidays in Japan"));
    assert_eq!(calendar.items.len(), 1);
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        &[(
            "ja.japanese#holiday@group.v.calendar.google.com".to_string(),
            Some("test-key".to_string())
        )]
    );
}

#[tokio::test]
async fn test_holiday_proxy_reports_upstream_errors() {
    let upstream = spawn_upstream(Seen::default()).await;
    let api = spawn_daybook(HolidayConfig {
        api_url: upstream,
        api_key: "wrong".to_string(),
        ..Default::default()
    })
    .await;

    let source = HttpHolidaySource::new(reqwest::Client::new(), &api);
    let err = source.fetch_by_region("en.usa").await.unwrap_err();

    match err {
        CoreError::HolidaySource(region, message) => {
            assert_eq!(region, "en.usa");
            assert!(message.contains("API key not valid"), "{message}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
