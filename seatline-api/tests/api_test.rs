use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use futures_util::StreamExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use seatline_api::{app, AppState};
use seatline_core::{
    BroadcastNotifier, MemoryAdminCodes, MemoryBookingStore, ReservationDesk, CHANGE_EVENT_NAME,
};

fn test_app() -> Router {
    let desk = ReservationDesk::new(
        Arc::new(MemoryBookingStore::new()),
        Arc::new(MemoryAdminCodes::new(["RESET2024"])),
        Arc::new(BroadcastNotifier::new(16)),
    );
    app(AppState::new(desk))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn book(app: &Router, vehicle: i64, seat: i64) -> StatusCode {
    send(app, post_json("/v1/bookings", json!({ "vehicle_id": vehicle, "seat_number": seat })))
        .await
        .0
}

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_book_seat_then_conflict() {
    let app = test_app();

    let (status, body) = send(&app, post_json("/v1/bookings", json!({ "vehicle_id": 3, "seat_number": 7 }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["vehicle_id"], 3);
    assert_eq!(body["seat_number"], 7);
    assert!(uuid::Uuid::parse_str(body["id"].as_str().unwrap()).is_ok());

    let (status, body) = send(&app, post_json("/v1/bookings", json!({ "vehicle_id": 3, "seat_number": 7 }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already booked"));
}

#[tokio::test]
async fn test_out_of_range_seat_is_bad_request() {
    let app = test_app();
    assert_eq!(book(&app, 3, 31).await, StatusCode::BAD_REQUEST);
    assert_eq!(book(&app, 9, 1).await, StatusCode::BAD_REQUEST);
    assert_eq!(book(&app, 0, 0).await, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_body_uses_error_envelope() {
    let app = test_app();

    let bodies = [
        json!({ "vehicle_id": "3", "seat_number": 7 }),
        json!({ "vehicle_id": 3 }),
        json!({ "vehicle_id": 3.5, "seat_number": 7 }),
    ];
    for body in bodies {
        let (status, body) = send(&app, post_json("/v1/bookings", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    let (status, body) = send(&app, post_json("/v1/admin/reset", json!({ "pin": "RESET2024" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_concurrent_requests_for_same_seat() {
    let app = test_app();

    let (a, b) = tokio::join!(book(&app, 3, 7), book(&app, 3, 7));
    let mut statuses = vec![a, b];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::CONFLICT]);

    let (_, body) = send(&app, get("/v1/bookings")).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_fleet_snapshot_counts() {
    let app = test_app();
    assert_eq!(book(&app, 3, 2).await, StatusCode::CREATED);
    assert_eq!(book(&app, 3, 15).await, StatusCode::CREATED);

    let (status, body) = send(&app, get("/v1/fleet")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_seats"], 240);
    assert_eq!(body["total_booked"], 2);

    let bus3 = &body["vehicles"][2];
    assert_eq!(bus3["name"], "Bus 3");
    assert_eq!(bus3["booked_seats"], json!([2, 15]));
    assert_eq!(bus3["booked_count"], 2);
    assert_eq!(bus3["available_count"], 28);
}

#[tokio::test]
async fn test_verify_code() {
    let app = test_app();
    let (_, body) = send(&app, post_json("/v1/admin/codes/verify", json!({ "code": "RESET2024" }))).await;
    assert_eq!(body["valid"], true);
    let (_, body) = send(&app, post_json("/v1/admin/codes/verify", json!({ "code": "" }))).await;
    assert_eq!(body["valid"], false);
    let (_, body) = send(&app, post_json("/v1/admin/codes/verify", json!({ "code": "OTHER" }))).await;
    assert_eq!(body["valid"], false);
}

#[tokio::test]
async fn test_reset_with_invalid_code_is_forbidden_and_keeps_rows() {
    let app = test_app();
    assert_eq!(book(&app, 1, 1).await, StatusCode::CREATED);
    assert_eq!(book(&app, 2, 2).await, StatusCode::CREATED);

    let (status, _) = send(&app, post_json("/v1/admin/reset", json!({ "code": "WRONG" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = send(&app, get("/v1/bookings")).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_reset_with_valid_code_clears_everything() {
    let app = test_app();
    assert_eq!(book(&app, 1, 1).await, StatusCode::CREATED);
    assert_eq!(book(&app, 8, 30).await, StatusCode::CREATED);

    let (status, body) = send(&app, post_json("/v1/admin/reset", json!({ "code": "RESET2024" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cleared"], 2);

    let (_, body) = send(&app, get("/v1/bookings")).await;
    assert!(body.as_array().unwrap().is_empty());

    // Previously booked seats can be taken again
    assert_eq!(book(&app, 1, 1).await, StatusCode::CREATED);
}

#[tokio::test]
async fn test_change_stream_emits_on_booking() {
    let app = test_app();

    let response = app.clone().oneshot(get("/v1/bookings/stream")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let mut body = response.into_body().into_data_stream();

    assert_eq!(book(&app, 5, 5).await, StatusCode::CREATED);

    let frame = tokio::time::timeout(Duration::from_secs(2), body.next())
        .await
        .expect("no change event within timeout")
        .unwrap()
        .unwrap();
    let text = String::from_utf8(frame.to_vec()).unwrap();
    assert!(text.contains(&format!("event: {}", CHANGE_EVENT_NAME)));
    assert!(text.contains(r#""kind":"inserted""#));
}
