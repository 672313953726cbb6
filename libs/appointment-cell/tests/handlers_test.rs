use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use appointment_cell::router::appointment_routes;
use appointment_cell::services::booking::AppointmentBookingService;
use appointment_cell::store::{InMemoryAppointmentStore, InMemoryTreatmentCategoryStore};
use shared_config::AppConfig;
use shared_utils::FixedClock;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap()
}

fn test_app() -> Router {
    let service = Arc::new(AppointmentBookingService::new(
        &AppConfig::default(),
        Arc::new(InMemoryAppointmentStore::new()),
        Arc::new(InMemoryTreatmentCategoryStore::with_defaults()),
        Arc::new(FixedClock(now())),
    ));
    appointment_routes(service)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn booking_body(doctor_id: Uuid) -> Value {
    json!({
        "patient_id": Uuid::new_v4(),
        "doctor_id": doctor_id,
        "appointment_date": "2025-06-02T10:00:00Z",
        "duration_minutes": 30
    })
}

#[tokio::test]
async fn booking_returns_the_created_appointment() {
    let app = test_app();

    let response = app
        .oneshot(post_json("/", booking_body(Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["appointment"]["status"], json!("pending"));
}

#[tokio::test]
async fn double_booking_returns_conflict() {
    let app = test_app();
    let doctor = Uuid::new_v4();

    let first = app
        .clone()
        .oneshot(post_json("/", booking_body(doctor)))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .oneshot(post_json("/", booking_body(doctor)))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn booking_in_the_past_is_a_bad_request() {
    let app = test_app();

    let body = json!({
        "patient_id": Uuid::new_v4(),
        "doctor_id": Uuid::new_v4(),
        "appointment_date": "2025-06-02T07:00:00Z",
        "duration_minutes": 30
    });
    let response = app.oneshot(post_json("/", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_endpoint_walks_the_lifecycle() {
    let app = test_app();

    let created = app
        .clone()
        .oneshot(post_json("/", booking_body(Uuid::new_v4())))
        .await
        .unwrap();
    let id = body_json(created).await["appointment"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let confirmed = app
        .clone()
        .oneshot(post_json(
            &format!("/{}/status", id),
            json!({ "target_status": "confirmed" }),
        ))
        .await
        .unwrap();
    assert_eq!(confirmed.status(), StatusCode::OK);

    let completed = app
        .clone()
        .oneshot(post_json(
            &format!("/{}/status", id),
            json!({ "target_status": "completed", "amount": "1 500,50" }),
        ))
        .await
        .unwrap();
    assert_eq!(completed.status(), StatusCode::OK);
    let body = body_json(completed).await;
    assert_eq!(body["appointment"]["amount"], json!(1500.50));

    // Terminal: a cancel after completion must be rejected.
    let cancelled = app
        .oneshot(post_json(
            &format!("/{}/status", id),
            json!({ "target_status": "cancelled", "cancellation_reason": "too late" }),
        ))
        .await
        .unwrap();
    assert_eq!(cancelled.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cancellation_without_reason_is_rejected() {
    let app = test_app();

    let created = app
        .clone()
        .oneshot(post_json("/", booking_body(Uuid::new_v4())))
        .await
        .unwrap();
    let id = body_json(created).await["appointment"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .oneshot(post_json(
            &format!("/{}/status", id),
            json!({ "target_status": "cancelled" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_appointment_is_not_found() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/{}", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn conflict_check_endpoint_reports_overlaps() {
    let app = test_app();
    let doctor = Uuid::new_v4();

    app.clone()
        .oneshot(post_json("/", booking_body(doctor)))
        .await
        .unwrap();

    let uri = format!(
        "/conflicts/check?doctor_id={}&start_time=2025-06-02T10:15:00Z&duration_minutes=30",
        doctor
    );
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["has_conflict"], json!(true));
}

#[tokio::test]
async fn categories_are_seeded_and_extensible() {
    let app = test_app();

    let listed = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/categories")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(listed.status(), StatusCode::OK);
    let body = body_json(listed).await;
    assert!(body["categories"].as_array().unwrap().len() >= 4);

    let created = app
        .clone()
        .oneshot(post_json(
            "/categories",
            json!({ "name": "Orthodontics", "default_duration_minutes": 50, "color": "#aa66cc" }),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::OK);

    let duplicate = app
        .oneshot(post_json(
            "/categories",
            json!({ "name": "orthodontics", "default_duration_minutes": 20, "color": "#000000" }),
        ))
        .await
        .unwrap();
    assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);
}
