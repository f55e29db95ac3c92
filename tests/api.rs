use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use quickpass_server::config::Config;
use quickpass_server::routes::create_routes;
use quickpass_server::state::AppState;
use quickpass_server::store::MemoryStore;

fn app() -> Router {
    let config = Config::from_lookup(|_| None).unwrap();
    create_routes(AppState::new(Arc::new(MemoryStore::new())), &config)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, json)
}

fn account_body(email: &str) -> Value {
    json!({
        "first_name": "Jane",
        "last_name": "Doe",
        "email": email,
        "password": "hunter2",
    })
}

fn event_body(name: &str) -> Value {
    json!({
        "name": name,
        "description": "Regular season",
        "venue": "ScotiabankArena",
        "date": "2025-03-01T19:30:00Z",
        "total_tickets": 500,
    })
}

async fn seed_account_and_event(app: &Router) {
    let account = account_body("jane@example.com");
    let (status, _, _) = send(app, Method::POST, "/api/accounts", Some(account)).await;
    assert_eq!(status, StatusCode::CREATED);
    let event = event_body("Raptors vs Celtics");
    let (status, _, _) = send(app, Method::POST, "/api/events", Some(event)).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn health_check_carries_security_and_request_id_headers() {
    let app = app();
    let (status, headers, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.get("x-request-id").is_some());
    assert!(headers.get("strict-transport-security").is_none());
}

#[tokio::test]
async fn create_then_fetch_account_hides_password() {
    let app = app();
    let (status, _, created) =
        send(&app, Method::POST, "/api/accounts", Some(account_body("jane@example.com"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["account_id"], 1);
    assert!(created["data"].get("password").is_none());

    let (status, _, fetched) = send(&app, Method::GET, "/api/accounts/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["email"], "jane@example.com");
}

#[tokio::test]
async fn missing_entities_return_not_found() {
    let app = app();
    for uri in ["/api/accounts/42", "/api/events/42", "/api/tickets/42"] {
        let (status, _, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    let (status, _, _) = send(&app, Method::DELETE, "/api/accounts/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_payloads_are_rejected() {
    let app = app();

    let (status, _, body) =
        send(&app, Method::POST, "/api/accounts", Some(account_body("  "))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let mut event = event_body("Concert");
    event["total_tickets"] = json!(-1);
    let (status, _, _) = send(&app, Method::POST, "/api/events", Some(event)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let no_venue = json!({"name": "No venue"});
    let (status, _, body) = send(&app, Method::POST, "/api/events", Some(no_venue)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn ticket_for_missing_account_violates_constraint() {
    let app = app();
    let (status, _, _) = send(&app, Method::POST, "/api/events", Some(event_body("Gala"))).await;
    assert_eq!(status, StatusCode::CREATED);

    let ticket = json!({
        "price": "25.00",
        "seat_number": "A1",
        "account_id": 7,
        "event_id": 1,
    });
    let (status, _, body) = send(&app, Method::POST, "/api/tickets", Some(ticket)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "CONSTRAINT_VIOLATION");
}

#[tokio::test]
async fn link_and_unlink_account_with_event() {
    let app = app();
    seed_account_and_event(&app).await;

    let (status, _, linked) = send(&app, Method::POST, "/api/events/1/accounts/1", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(linked["data"]["seat_number"], "unassigned");

    let (status, _, again) = send(&app, Method::POST, "/api/events/1/accounts/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(again["data"].is_null());

    let (_, _, tickets) = send(&app, Method::GET, "/api/accounts/1/tickets", None).await;
    assert_eq!(tickets["data"].as_array().unwrap().len(), 1);

    let (status, _, unlinked) = send(&app, Method::DELETE, "/api/events/1/accounts/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unlinked["data"]["link_removed"], true);
    assert_eq!(unlinked["data"]["tickets_removed"], 1);

    let (_, _, tickets) = send(&app, Method::GET, "/api/accounts/1/tickets", None).await;
    assert!(tickets["data"].as_array().unwrap().is_empty());

    let (status, _, _) = send(&app, Method::POST, "/api/events/1/accounts/9", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_account_keeps_event_and_drops_tickets() {
    let app = app();
    seed_account_and_event(&app).await;
    send(&app, Method::POST, "/api/events/1/accounts/1", None).await;

    let (status, _, _) = send(&app, Method::DELETE, "/api/accounts/1", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(&app, Method::GET, "/api/events/1", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, _, tickets) = send(&app, Method::GET, "/api/tickets", None).await;
    assert!(tickets["data"].as_array().unwrap().is_empty());

    let (_, _, events) = send(&app, Method::GET, "/api/events/details", None).await;
    assert!(events["data"][0]["tickets"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn update_checks_path_id_and_existence() {
    let app = app();
    seed_account_and_event(&app).await;

    let mut body = account_body("jane.doe@example.com");
    body["account_id"] = json!(2);
    let (status, _, _) = send(&app, Method::PUT, "/api/accounts/1", Some(body.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    body["account_id"] = json!(1);
    let (status, _, updated) = send(&app, Method::PUT, "/api/accounts/1", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["email"], "jane.doe@example.com");

    let (status, _, _) = send(&app, Method::PUT, "/api/events/5", Some(event_body("Moved"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_path_id_uses_error_envelope() {
    let app = app();
    for (method, uri) in [
        (Method::GET, "/api/accounts/abc"),
        (Method::DELETE, "/api/tickets/x1"),
        (Method::POST, "/api/events/1/accounts/me"),
    ] {
        let (status, _, body) = send(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn ticket_price_must_be_whole_cents() {
    let app = app();
    seed_account_and_event(&app).await;

    let mut ticket = json!({
        "price": "1.005",
        "seat_number": "B2",
        "account_id": 1,
        "event_id": 1,
    });
    let (status, _, body) = send(&app, Method::POST, "/api/tickets", Some(ticket.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    ticket["price"] = json!("1.5");
    let (status, _, body) = send(&app, Method::POST, "/api/tickets", Some(ticket)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["price"], "1.50");
}

#[tokio::test]
async fn ticket_update_without_booking_date_keeps_it() {
    let app = app();
    seed_account_and_event(&app).await;

    let ticket = json!({
        "price": "20.00",
        "seat_number": "B2",
        "booking_date": "2025-02-01T12:00:00Z",
        "account_id": 1,
        "event_id": 1,
    });
    let (status, _, _) = send(&app, Method::POST, "/api/tickets", Some(ticket)).await;
    assert_eq!(status, StatusCode::CREATED);

    let replacement = json!({
        "price": "25.00",
        "seat_number": "B3",
        "account_id": 1,
        "event_id": 1,
    });
    let (status, _, updated) =
        send(&app, Method::PUT, "/api/tickets/1", Some(replacement)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["seat_number"], "B3");
    assert_eq!(updated["data"]["booking_date"], "2025-02-01T12:00:00Z");
}
