mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::{DateTime, Duration, Utc};
use common::TestApp;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn week_hours() -> Value {
    let day = json!({"start": "09:00:00", "end": "17:00:00", "enabled": true});
    Value::Array(vec![day; 7])
}

fn in_days_at(days: i64, hour: u32, min: u32) -> DateTime<Utc> {
    let date = (Utc::now() + Duration::days(days)).date_naive();
    date.and_hms_opt(hour, min, 0).unwrap().and_utc()
}

async fn setup(app: &TestApp, buffer_min: i32) -> String {
    let schedule = json!({
        "timezone": "UTC",
        "hours": week_hours(),
        "buffer_min": buffer_min,
        "slot_interval_min": 30,
        "advance_booking_days": 30,
        "auto_confirm": true
    });
    let res = app.router.clone().oneshot(
        Request::builder().method("PUT").uri("/api/v1/c1/schedule")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(schedule.to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let svc_res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/c1/services")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({
                "name": "Gutter cleaning",
                "duration_min": 60,
                "price_cents": 8000
            }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(svc_res.status(), StatusCode::CREATED);
    parse_body(svc_res).await["id"].as_str().unwrap().to_string()
}

fn booking_request(service_id: &str, start: DateTime<Utc>, client_n: usize) -> Request<Body> {
    Request::builder().method("POST").uri("/api/v1/c1/appointments")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({
            "service_id": service_id,
            "start": start.to_rfc3339(),
            "client": {"name": format!("Client {}", client_n), "email": format!("c{}@example.com", client_n)}
        }).to_string())).unwrap()
}

#[tokio::test]
async fn test_racing_identical_bookings_commit_exactly_once() {
    let app = TestApp::new().await;
    let svc = setup(&app, 0).await;
    let start = in_days_at(2, 10, 0);

    let mut handles = Vec::new();
    for n in 0..8 {
        let router = app.router.clone();
        let req = booking_request(&svc, start, n);
        handles.push(tokio::spawn(async move {
            router.oneshot(req).await.unwrap().status()
        }));
    }

    let mut created = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::CREATED => created += 1,
            StatusCode::CONFLICT => conflicts += 1,
            other => panic!("unexpected status {}", other),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(conflicts, 7);

    let list = app.router.clone().oneshot(
        Request::builder().method("GET").uri("/api/v1/c1/appointments")
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(parse_body(list).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_racing_overlapping_bookings_never_overlap() {
    let app = TestApp::new().await;
    let svc = setup(&app, 15).await;

    // Starts every 30 minutes of a 60 minute service with a 15 minute
    // buffer; only non-adjacent winners can coexist.
    let mut handles = Vec::new();
    for n in 0..8 {
        let router = app.router.clone();
        let req = booking_request(&svc, in_days_at(2, 9, 0) + Duration::minutes(n * 30), n as usize);
        handles.push(tokio::spawn(async move {
            router.oneshot(req).await.unwrap().status()
        }));
    }
    for handle in handles {
        let status = handle.await.unwrap();
        assert!(status == StatusCode::CREATED || status == StatusCode::CONFLICT);
    }

    let list = app.router.clone().oneshot(
        Request::builder().method("GET").uri("/api/v1/c1/appointments")
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    let appointments = parse_body(list).await;
    let spans: Vec<(DateTime<Utc>, DateTime<Utc>)> = appointments.as_array().unwrap().iter()
        .map(|a| {
            let s: DateTime<Utc> = a["start_time"].as_str().unwrap().parse().unwrap();
            let e: DateTime<Utc> = a["end_time"].as_str().unwrap().parse().unwrap();
            let buffer = Duration::minutes(15);
            (s - buffer, e + buffer)
        })
        .collect();
    assert!(!spans.is_empty());

    for (i, a) in spans.iter().enumerate() {
        for b in spans.iter().skip(i + 1) {
            assert!(a.1 <= b.0 || b.1 <= a.0, "buffered spans overlap: {:?} vs {:?}", a, b);
        }
    }
}
