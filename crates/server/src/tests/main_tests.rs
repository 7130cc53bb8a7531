use super::*;
use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{header, Request, Response},
};
use chrono::{DateTime, Utc};
use server_api::{EventService, ServiceError};
use shared::{
    domain::{Event, EventDraft, EventId},
    protocol::Paging,
};
use tower::ServiceExt;

use crate::{config::Settings, shell::SiteMeta};

async fn test_app() -> Router {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    build_router(Arc::new(AppState::new(storage, &Settings::default())))
}

struct FailingEventService;

fn storage_failure() -> ServiceError {
    ServiceError::Storage(anyhow::anyhow!("database is locked"))
}

#[async_trait]
impl EventService for FailingEventService {
    async fn get_all(&self, _paging: Paging) -> Result<Option<Vec<Event>>, ServiceError> {
        Err(storage_failure())
    }

    async fn get_by_id(&self, _event_id: EventId) -> Result<Option<Event>, ServiceError> {
        Err(storage_failure())
    }

    async fn create(&self, _draft: EventDraft) -> Result<Event, ServiceError> {
        Err(storage_failure())
    }

    async fn update(&self, _event_id: EventId, _draft: EventDraft) -> Result<Event, ServiceError> {
        Err(storage_failure())
    }

    async fn delete(&self, _event_id: EventId) -> Result<bool, ServiceError> {
        Err(storage_failure())
    }

    async fn upcoming(&self, _from: DateTime<Utc>, _limit: u32) -> Result<Vec<Event>, ServiceError> {
        Err(storage_failure())
    }
}

async fn failing_app() -> Router {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    build_router(Arc::new(AppState {
        events: Arc::new(FailingEventService),
        storage,
        default_page_size: 10,
        max_page_size: 100,
        site: SiteMeta::default(),
    }))
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn event_body(name: &str, starts_at: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "location": "Sede central",
        "startsAt": starts_at,
    })
}

async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body")
        .to_vec()
}

async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json")
}

async fn create(app: &Router, name: &str, starts_at: &str) -> Event {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/events", event_body(name, starts_at)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    serde_json::from_slice(&body_bytes(response).await).expect("event")
}

fn bad_request(message: &str) -> serde_json::Value {
    serde_json::json!({ "success": false, "status": 400, "message": message })
}

#[tokio::test]
async fn healthz_reports_ok_when_storage_is_ready() {
    let app = test_app().await;
    let response = app
        .oneshot(empty_request("GET", "/healthz"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"ok");
}

#[tokio::test]
async fn listing_empty_store_returns_no_content() {
    let app = test_app().await;
    let response = app
        .oneshot(empty_request("GET", "/api/events"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn create_returns_created_with_location() {
    let app = test_app().await;
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/events",
            event_body("Asamblea", "2026-11-02T18:00:00Z"),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);

    let location = response
        .headers()
        .get(header::LOCATION)
        .expect("location")
        .to_str()
        .expect("ascii")
        .to_string();
    let body = body_json(response).await;
    assert_eq!(location, format!("/api/events/{}", body["id"]));
    assert_eq!(body["name"], "Asamblea");
    assert_eq!(body["location"], "Sede central");
    assert!(body["createdAt"].is_string());

    let response = app
        .oneshot(empty_request("GET", &location))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["name"], "Asamblea");
}

#[tokio::test]
async fn create_rejects_null_malformed_and_invalid_bodies() {
    let app = test_app().await;
    let invalid = [
        json_request("POST", "/api/events", serde_json::Value::Null),
        json_request("POST", "/api/events", serde_json::json!({ "name": "sin fecha" })),
        json_request(
            "POST",
            "/api/events",
            event_body("   ", "2026-11-02T18:00:00Z"),
        ),
        json_request(
            "POST",
            "/api/events",
            serde_json::json!({
                "name": "al revés",
                "startsAt": "2026-11-02T18:00:00Z",
                "endsAt": "2026-11-01T18:00:00Z",
            }),
        ),
        empty_request("POST", "/api/events"),
    ];

    for request in invalid {
        let response = app.clone().oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, bad_request("Invalid event"));
    }
}

#[tokio::test]
async fn get_by_id_validates_id_and_reports_absence() {
    let app = test_app().await;

    for uri in ["/api/events/0", "/api/events/-4", "/api/events/abc"] {
        let response = app
            .clone()
            .oneshot(empty_request("GET", uri))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body_json(response).await, bad_request("Invalid ID"));
    }

    let response = app
        .oneshot(empty_request("GET", "/api/events/77"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn list_pages_through_events() {
    let app = test_app().await;
    create(&app, "uno", "2026-11-01T18:00:00Z").await;
    create(&app, "dos", "2026-11-02T18:00:00Z").await;
    create(&app, "tres", "2026-11-03T18:00:00Z").await;

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/events"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let all = body_json(response).await;
    assert_eq!(all.as_array().expect("array").len(), 3);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/events?pageNumber=2&pageSize=2"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await;
    let page = page.as_array().expect("array");
    assert_eq!(page.len(), 1);
    assert_eq!(page[0]["name"], "tres");

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/events?pageNumber=3&pageSize=2"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(empty_request("GET", "/api/events?pageNumber=abc"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_returns_accepted_with_updated_event() {
    let app = test_app().await;
    let created = create(&app, "Antes", "2026-11-02T18:00:00Z").await;

    let mut body = event_body("Después", "2026-11-03T18:00:00Z");
    body["id"] = serde_json::json!(created.id.0);
    let response = app
        .clone()
        .oneshot(json_request("PUT", "/api/events", body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(
        response.headers().get(header::LOCATION).expect("location"),
        format!("/api/events/{}", created.id).as_str()
    );
    let updated: Event = serde_json::from_slice(&body_bytes(response).await).expect("event");
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Después");
    assert_eq!(updated.created_at, created.created_at);
}

#[tokio::test]
async fn update_rejects_missing_id_and_fails_for_unknown_event() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/events",
            event_body("Sin id", "2026-11-02T18:00:00Z"),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, bad_request("Invalid event"));

    let mut body = event_body("Fantasma", "2026-11-02T18:00:00Z");
    body["id"] = serde_json::json!(99);
    let response = app
        .oneshot(json_request("PUT", "/api/events", body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_bytes(response).await, b"event 99 not found");
}

#[tokio::test]
async fn delete_returns_accepted_even_for_unknown_event() {
    let app = test_app().await;
    let created = create(&app, "Efímero", "2026-11-02T18:00:00Z").await;

    let uri = format!("/api/events/{}", created.id);
    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &uri))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(
        response.headers().get(header::LOCATION).expect("location"),
        uri.as_str()
    );

    let response = app
        .clone()
        .oneshot(empty_request("GET", &uri))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &uri))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let response = app
        .oneshot(empty_request("DELETE", "/api/events/not-a-number"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, bad_request("Invalid event"));
}

#[tokio::test]
async fn delete_passes_non_positive_ids_to_the_service() {
    let app = test_app().await;
    for uri in ["/api/events/0", "/api/events/-3"] {
        let response = app
            .clone()
            .oneshot(empty_request("DELETE", uri))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::ACCEPTED, "{uri}");
        assert_eq!(
            response.headers().get(header::LOCATION).expect("location"),
            uri
        );
    }

    let app = failing_app().await;
    let response = app
        .oneshot(empty_request("DELETE", "/api/events/0"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn service_failures_map_to_internal_server_error() {
    let app = failing_app().await;
    let requests = [
        empty_request("GET", "/api/events"),
        empty_request("GET", "/api/events/1"),
        json_request(
            "POST",
            "/api/events",
            event_body("Asamblea", "2026-11-02T18:00:00Z"),
        ),
        json_request(
            "PUT",
            "/api/events",
            serde_json::json!({ "id": 1, "name": "x", "startsAt": "2026-11-02T18:00:00Z" }),
        ),
        empty_request("DELETE", "/api/events/1"),
    ];

    for request in requests {
        let response = app.clone().oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_bytes(response).await, b"database is locked");
    }
}

#[tokio::test]
async fn validation_runs_before_the_service_is_called() {
    let app = failing_app().await;
    let response = app
        .oneshot(empty_request("GET", "/api/events/0"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let app = test_app().await;
    let body = event_body(&"x".repeat(70 * 1024), "2026-11-02T18:00:00Z").to_string();
    let request = Request::builder()
        .method("POST")
        .uri("/api/events")
        .header("content-type", "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn landing_page_renders_shell_with_upcoming_events() {
    let app = test_app().await;
    create(&app, "Torneo de dominó", "2099-01-15T20:00:00Z").await;
    create(&app, "Ya pasó", "2001-01-15T20:00:00Z").await;

    let response = app
        .oneshot(empty_request("GET", "/"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(response).await).expect("utf8");
    assert!(html.contains("<title>Asomameco</title>"));
    assert!(html.contains(r#"data-provider="member""#));
    assert!(html.contains("Torneo de dominó"));
    assert!(!html.contains("Ya pasó"));
}

#[tokio::test]
async fn landing_page_reports_unavailable_events() {
    let app = failing_app().await;
    let response = app
        .oneshot(empty_request("GET", "/"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let html = String::from_utf8(body_bytes(response).await).expect("utf8");
    assert!(html.contains("<title>Asomameco</title>"));
}

#[tokio::test]
async fn favicon_is_served_as_svg() {
    let app = test_app().await;
    let response = app
        .oneshot(empty_request("GET", "/favicon.svg"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).expect("type"),
        "image/svg+xml"
    );
    assert!(body_bytes(response).await.starts_with(b"<svg"));
}
