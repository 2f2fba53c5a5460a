use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;

use livehub_api::{AppState, build_app};
use livehub_core::config::{AppConfig, LedgerBackend};
use livehub_core::types::id::LessonId;
use livehub_provider::MockMeetingProvider;
use livehub_scheduler::{LicenseAllocator, MemoryLedger};

struct TestApp {
    router: Router,
    provider: Arc<MockMeetingProvider>,
}

fn test_app() -> TestApp {
    let mut config = AppConfig::default();
    config.scheduling.ledger = LedgerBackend::Memory;

    let provider = Arc::new(MockMeetingProvider::new());
    let allocator = LicenseAllocator::new(
        Arc::new(MemoryLedger::new()),
        provider.clone(),
        config.scheduling.clone(),
        Duration::from_secs(5),
    );

    TestApp {
        router: build_app(AppState::new(config, allocator, None)),
        provider,
    }
}

async fn send(app: &TestApp, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn tomorrow(hour: i64, minute: i64) -> DateTime<Utc> {
    let base = (Utc::now() + chrono::Duration::days(1))
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc();
    base + chrono::Duration::minutes(hour * 60 + minute)
}

fn ts(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

async fn add_license(app: &TestApp, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/admin/licenses",
        Some(json!({ "email": email })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn schedule(app: &TestApp, lesson: LessonId, start: DateTime<Utc>, minutes: u32) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        &format!("/api/lessons/{lesson}/meeting"),
        Some(json!({
            "topic": "Live class",
            "start_time": ts(start),
            "duration_minutes": minutes,
        })),
    )
    .await
}

#[tokio::test]
async fn test_health_reports_memory_ledger() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["ledger"], "memory");
}

#[tokio::test]
async fn test_third_overlapping_lesson_gets_licenses_exhausted() {
    let app = test_app();
    add_license(&app, "l1@example.com").await;
    add_license(&app, "l2@example.com").await;

    let (a, _) = schedule(&app, LessonId::new(), tomorrow(10, 0), 60).await;
    let (b, _) = schedule(&app, LessonId::new(), tomorrow(10, 30), 60).await;
    let (c, body) = schedule(&app, LessonId::new(), tomorrow(10, 45), 30).await;

    assert_eq!(a, StatusCode::OK);
    assert_eq!(b, StatusCode::OK);
    assert_eq!(c, StatusCode::CONFLICT);
    assert_eq!(body["error"], "LICENSES_EXHAUSTED");
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_lesson_meeting_lifecycle() {
    let app = test_app();
    let license_id = add_license(&app, "host@example.com").await;
    let lesson = LessonId::new();
    let uri = format!("/api/lessons/{lesson}/meeting");

    let (status, body) = schedule(&app, lesson, tomorrow(9, 0), 45).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["license_id"], license_id.as_str());
    let booking_id = body["data"]["booking_id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "materialized");
    assert_eq!(body["data"]["duration_minutes"], 45);

    let (status, body) = send(&app, Method::GET, &format!("/api/meetings/{booking_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["lesson_id"], lesson.to_string());

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_invalid_windows_are_rejected() {
    let app = test_app();
    add_license(&app, "host@example.com").await;

    let (status, body) = schedule(&app, LessonId::new(), tomorrow(9, 0), 0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");

    let past = Utc::now() - chrono::Duration::hours(2);
    let (status, body) = schedule(&app, LessonId::new(), past, 30).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_provider_failure_maps_to_bad_gateway() {
    let app = test_app();
    add_license(&app, "host@example.com").await;
    app.provider.set_fail_create(true);

    let lesson = LessonId::new();
    let (status, body) = schedule(&app, lesson, tomorrow(9, 0), 30).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "PROVIDER_ERROR");

    let (status, body) = send(&app, Method::GET, &format!("/api/lessons/{lesson}/meeting"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "pending_assignment");
    assert!(body["data"]["license_id"].is_null());
}

#[tokio::test]
async fn test_availability_and_usage() {
    let app = test_app();
    add_license(&app, "a@example.com").await;
    add_license(&app, "b@example.com").await;
    schedule(&app, LessonId::new(), tomorrow(14, 0), 60).await;

    let query = format!(
        "start_time={}&duration_minutes=30",
        ts(tomorrow(14, 30))
    );

    let (status, body) = send(&app, Method::GET, &format!("/api/licenses/available?{query}"), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["license_ids"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, Method::GET, &format!("/api/licenses/usage?{query}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["active_licenses"], 2);
    assert_eq!(body["data"]["busy_licenses"], 1);
    assert_eq!(body["data"]["free_licenses"], 1);
}

#[tokio::test]
async fn test_windows_beyond_the_scheduling_horizon_are_bad_requests() {
    let app = test_app();
    add_license(&app, "a@example.com").await;

    let far = Utc.with_ymd_and_hms(9999, 12, 31, 23, 30, 0).unwrap();
    for path in ["available", "usage"] {
        let uri = format!(
            "/api/licenses/{path}?start_time={}&duration_minutes=60",
            ts(far)
        );
        let (status, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    let edge = ts(DateTime::<Utc>::MAX_UTC - chrono::Duration::minutes(30)).replace('+', "%2B");
    let uri = format!("/api/licenses/available?start_time={edge}&duration_minutes=60");
    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = schedule(&app, LessonId::new(), far, 60).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
}

#[tokio::test]
async fn test_deactivated_license_is_not_offered() {
    let app = test_app();
    let id = add_license(&app, "solo@example.com").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/admin/licenses/{id}/active"),
        Some(json!({ "active": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_active"], false);

    let (status, body) = schedule(&app, LessonId::new(), tomorrow(9, 0), 30).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "LICENSES_EXHAUSTED");

    let (_, body) = send(&app, Method::GET, "/api/admin/licenses", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_license_email_conflicts() {
    let app = test_app();
    add_license(&app, "dup@example.com").await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/admin/licenses",
        Some(json!({ "email": "dup@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_list_meetings_in_range() {
    let app = test_app();
    add_license(&app, "host@example.com").await;
    for hour in [8, 10, 12] {
        schedule(&app, LessonId::new(), tomorrow(hour, 0), 30).await;
    }

    let uri = format!(
        "/api/meetings?from={}&to={}",
        ts(tomorrow(9, 0)),
        ts(tomorrow(12, 0))
    );
    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}
