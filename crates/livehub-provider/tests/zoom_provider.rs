use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, post};
use axum::{Json, Router};
use chrono::{TimeZone, Utc};
use serde_json::{Value, json};

use livehub_core::config::{ProviderConfig, ProviderKind};
use livehub_core::error::ErrorKind;
use livehub_core::traits::{CreateMeetingRequest, MeetingProvider};
use livehub_provider::ZoomProvider;

/// Owners and meeting numbers the stub API has seen, as decoded by routing.
#[derive(Debug, Default)]
struct Seen {
    owners: Vec<String>,
    deleted: Vec<i64>,
}

type Shared = Arc<Mutex<Seen>>;

async fn create(
    State(seen): State<Shared>,
    Path(owner): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    seen.lock().unwrap().owners.push(owner.clone());
    if owner.starts_with("suspended") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "code": 1001, "message": "User does not exist" })),
        );
    }
    assert_eq!(body["type"], 2);
    (
        StatusCode::CREATED,
        Json(json!({ "id": 81234567890_i64, "password": "x7Kq2p" })),
    )
}

async fn remove(State(seen): State<Shared>, Path(number): Path<i64>) -> StatusCode {
    seen.lock().unwrap().deleted.push(number);
    match number {
        404 => StatusCode::NOT_FOUND,
        500 => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::NO_CONTENT,
    }
}

async fn stub_api() -> (ZoomProvider, Shared) {
    let seen = Shared::default();
    let app = Router::new()
        .route("/v2/users/{owner}/meetings", post(create))
        .route("/v2/meetings/{number}", delete(remove))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let provider = ZoomProvider::new(&ProviderConfig {
        kind: ProviderKind::Zoom,
        base_url: format!("http://{addr}/v2/"),
        access_token: "token".to_string(),
        timeout_seconds: 5,
    })
    .unwrap();
    (provider, seen)
}

fn request(owner: &str) -> CreateMeetingRequest {
    CreateMeetingRequest {
        topic: "Geometry".to_string(),
        start_time: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        duration_minutes: 50,
        owner_identity: owner.to_string(),
        previous_meeting_number: None,
    }
}

#[tokio::test]
async fn test_created_meeting_is_parsed() {
    let (provider, seen) = stub_api().await;
    let meeting = provider
        .create_meeting(&request("host@example.com"))
        .await
        .unwrap();

    assert_eq!(meeting.meeting_number, 81234567890);
    assert_eq!(meeting.passcode, "x7Kq2p");
    assert_eq!(seen.lock().unwrap().owners, vec!["host@example.com"]);
}

#[tokio::test]
async fn test_owner_with_reserved_characters_reaches_its_route() {
    let (provider, seen) = stub_api().await;
    provider
        .create_meeting(&request("ops/host?x@example.com"))
        .await
        .unwrap();
    assert_eq!(seen.lock().unwrap().owners, vec!["ops/host?x@example.com"]);
}

#[tokio::test]
async fn test_rejected_create_is_a_provider_error() {
    let (provider, _) = stub_api().await;
    let err = provider
        .create_meeting(&request("suspended@example.com"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ExternalService);
    assert!(err.message.contains("400"), "{}", err.message);
}

#[tokio::test]
async fn test_delete_tolerates_missing_meeting_but_not_server_errors() {
    let (provider, seen) = stub_api().await;

    provider.delete_meeting(81234567890).await.unwrap();
    provider.delete_meeting(404).await.unwrap();
    let err = provider.delete_meeting(500).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::ExternalService);

    assert_eq!(seen.lock().unwrap().deleted, vec![81234567890, 404, 500]);
}
