mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::{Duration, Utc};
use common::TestApp;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_service(app: &TestApp, contractor: &str, payload: Value) -> axum::response::Response {
    app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/{}/services", contractor))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string())).unwrap()
    ).await.unwrap()
}

#[tokio::test]
async fn test_service_create_and_get() {
    let app = TestApp::new().await;

    let res = create_service(&app, "c1", json!({
        "name": "Drain unblocking",
        "description": "Includes camera inspection",
        "duration_min": 90,
        "prep_min": 15,
        "cleanup_min": 15,
        "price_cents": 22000,
        "deposit_percent_override": 30
    })).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = parse_body(res).await;
    assert_eq!(created["name"], "Drain unblocking");
    assert_eq!(created["active"], true);
    let id = created["id"].as_str().unwrap();

    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri(format!("/api/v1/c1/services/{}", id))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let fetched = parse_body(res).await;
    assert_eq!(fetched["duration_min"], 90);
    assert_eq!(fetched["deposit_percent_override"], 30);
}

#[tokio::test]
async fn test_service_list_scoped_to_contractor() {
    let app = TestApp::new().await;
    create_service(&app, "c1", json!({"name": "A", "duration_min": 30, "price_cents": 100})).await;
    create_service(&app, "c1", json!({"name": "B", "duration_min": 30, "price_cents": 100})).await;
    create_service(&app, "c2", json!({"name": "C", "duration_min": 30, "price_cents": 100})).await;

    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri("/api/v1/c1/services")
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(parse_body(res).await.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_service_of_other_contractor_not_visible() {
    let app = TestApp::new().await;
    let res = create_service(&app, "c1", json!({"name": "A", "duration_min": 30, "price_cents": 100})).await;
    let id = parse_body(res).await["id"].as_str().unwrap().to_string();

    let res = app.router.clone().oneshot(
        Request::builder().method("GET").uri(format!("/api/v1/c2/services/{}", id))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_service_rejects_bad_input() {
    let app = TestApp::new().await;

    let res = create_service(&app, "c1", json!({"name": "A", "duration_min": 0, "price_cents": 100})).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = create_service(&app, "c1", json!({"name": "A", "duration_min": 30, "price_cents": -5})).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = create_service(&app, "c1", json!({
        "name": "A", "duration_min": 30, "price_cents": 100, "deposit_percent_override": 120
    })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_service_partial_update() {
    let app = TestApp::new().await;
    let res = create_service(&app, "c1", json!({"name": "A", "duration_min": 30, "price_cents": 100})).await;
    let id = parse_body(res).await["id"].as_str().unwrap().to_string();

    let res = app.router.clone().oneshot(
        Request::builder().method("PUT").uri(format!("/api/v1/c1/services/{}", id))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"price_cents": 250, "name": "A+"}).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated = parse_body(res).await;
    assert_eq!(updated["price_cents"], 250);
    assert_eq!(updated["name"], "A+");
    assert_eq!(updated["duration_min"], 30);
}

#[tokio::test]
async fn test_service_times_frozen_after_first_booking() {
    let app = TestApp::new().await;

    let day = json!({"start": "09:00:00", "end": "17:00:00", "enabled": true});
    let res = app.router.clone().oneshot(
        Request::builder().method("PUT").uri("/api/v1/c1/schedule")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({
                "timezone": "UTC",
                "hours": Value::Array(vec![day; 7]),
                "auto_confirm": true
            }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = create_service(&app, "c1", json!({"name": "A", "duration_min": 60, "price_cents": 100})).await;
    let id = parse_body(res).await["id"].as_str().unwrap().to_string();

    let start = (Utc::now() + Duration::days(2)).date_naive()
        .and_hms_opt(10, 0, 0).unwrap().and_utc();
    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/c1/appointments")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({
                "service_id": id,
                "start": start.to_rfc3339(),
                "client": {"name": "Fred", "email": "fred@example.com"}
            }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // Duration can no longer change, but pricing still can.
    let res = app.router.clone().oneshot(
        Request::builder().method("PUT").uri(format!("/api/v1/c1/services/{}", id))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"duration_min": 90}).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app.router.clone().oneshot(
        Request::builder().method("PUT").uri(format!("/api/v1/c1/services/{}", id))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"price_cents": 500}).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
