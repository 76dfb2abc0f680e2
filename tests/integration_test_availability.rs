mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
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

fn in_days(days: i64) -> NaiveDate {
    (Utc::now() + Duration::days(days)).date_naive()
}

async fn setup(app: &TestApp, contractor: &str, schedule_extra: Value) -> String {
    let mut schedule = json!({
        "timezone": "UTC",
        "hours": week_hours(),
        "buffer_min": 0,
        "slot_interval_min": 30,
        "advance_booking_days": 30,
        "auto_confirm": true
    });
    if let (Some(base), Some(extra)) = (schedule.as_object_mut(), schedule_extra.as_object()) {
        for (k, v) in extra {
            base.insert(k.clone(), v.clone());
        }
    }

    let res = app.router.clone().oneshot(
        Request::builder().method("PUT").uri(format!("/api/v1/{}/schedule", contractor))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(schedule.to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let svc_res = app.router.clone().oneshot(
        Request::builder().method("POST").uri(format!("/api/v1/{}/services", contractor))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({
                "name": "Boiler service",
                "duration_min": 60,
                "price_cents": 12000
            }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(svc_res.status(), StatusCode::CREATED);
    parse_body(svc_res).await["id"].as_str().unwrap().to_string()
}

async fn get_day(app: &TestApp, contractor: &str, service: &str, date: NaiveDate) -> Value {
    let res = app.router.clone().oneshot(
        Request::builder().method("GET")
            .uri(format!("/api/v1/{}/availability?service_id={}&date={}", contractor, service, date))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    parse_body(res).await
}

#[tokio::test]
async fn test_open_day_offers_full_slot_grid() {
    let app = TestApp::new().await;
    let svc = setup(&app, "c1", json!({})).await;
    let date = in_days(2);

    let body = get_day(&app, "c1", &svc, date).await;
    let slots = body["slots"].as_array().unwrap();

    // 09:00 through 16:00 inclusive at a 30 minute step.
    assert_eq!(slots.len(), 15);
    assert!(slots.iter().all(|s| s["available"] == true));

    let first: DateTime<Utc> = slots[0]["start"].as_str().unwrap().parse().unwrap();
    let last: DateTime<Utc> = slots[14]["start"].as_str().unwrap().parse().unwrap();
    assert_eq!(first, date.and_hms_opt(9, 0, 0).unwrap().and_utc());
    assert_eq!(last, date.and_hms_opt(16, 0, 0).unwrap().and_utc());
}

#[tokio::test]
async fn test_buffered_booking_shadows_neighbouring_slots() {
    let app = TestApp::new().await;
    let svc = setup(&app, "c1", json!({"buffer_min": 15})).await;
    let date = in_days(2);

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/c1/appointments")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({
                "service_id": svc,
                "start": date.and_hms_opt(10, 0, 0).unwrap().and_utc().to_rfc3339(),
                "client": {"name": "Bob", "email": "bob@example.com"}
            }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let body = get_day(&app, "c1", &svc, date).await;
    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 15);

    let slot_at = |hour: u32, min: u32| {
        let start = date.and_hms_opt(hour, min, 0).unwrap().and_utc().to_rfc3339();
        slots.iter().find(|s| {
            s["start"].as_str().unwrap().parse::<DateTime<Utc>>().unwrap().to_rfc3339() == start
        }).unwrap().clone()
    };

    // 10:00-11:00 booked with a 15 minute buffer blocks 09:00 through 11:00.
    for (h, m) in [(9, 0), (9, 30), (10, 0), (10, 30), (11, 0)] {
        let s = slot_at(h, m);
        assert_eq!(s["available"], false, "{}:{:02} should be blocked", h, m);
        assert_eq!(s["reason"], "booked");
    }
    assert_eq!(slot_at(11, 30)["available"], true);
    assert_eq!(slot_at(9, 0).get("reason").is_some(), true);
}

#[tokio::test]
async fn test_cancelled_appointment_frees_the_slot() {
    let app = TestApp::new().await;
    let svc = setup(&app, "c1", json!({})).await;
    let date = in_days(5);
    let start = date.and_hms_opt(10, 0, 0).unwrap().and_utc();

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/c1/appointments")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({
                "service_id": svc,
                "start": start.to_rfc3339(),
                "client": {"name": "Bob", "email": "bob@example.com"}
            }).to_string())).unwrap()
    ).await.unwrap();
    let id = parse_body(res).await["id"].as_str().unwrap().to_string();

    let body = get_day(&app, "c1", &svc, date).await;
    let blocked = body["slots"].as_array().unwrap().iter()
        .filter(|s| s["available"] == false).count();
    assert!(blocked > 0);

    let res = app.router.clone().oneshot(
        Request::builder().method("PATCH").uri(format!("/api/v1/c1/appointments/{}", id))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"action": "cancel"}).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = get_day(&app, "c1", &svc, date).await;
    assert!(body["slots"].as_array().unwrap().iter().all(|s| s["available"] == true));
}

#[tokio::test]
async fn test_blackout_day_has_no_slots() {
    let app = TestApp::new().await;
    let date = in_days(3);
    let svc = setup(&app, "c1", json!({"blackout_dates": [date.to_string()]})).await;

    let body = get_day(&app, "c1", &svc, date).await;
    assert_eq!(body["slots"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_day_beyond_horizon_has_no_slots() {
    let app = TestApp::new().await;
    let svc = setup(&app, "c1", json!({"advance_booking_days": 3})).await;

    let body = get_day(&app, "c1", &svc, in_days(10)).await;
    assert_eq!(body["slots"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_recurring_block_removes_midday_slots() {
    let app = TestApp::new().await;
    let date = in_days(2);
    let weekday = chrono::Datelike::weekday(&date).num_days_from_monday();
    let svc = setup(&app, "c1", json!({
        "recurring_blocks": [{"weekday": weekday, "start": "12:00:00", "end": "13:00:00"}]
    })).await;

    let body = get_day(&app, "c1", &svc, date).await;
    let starts: Vec<DateTime<Utc>> = body["slots"].as_array().unwrap().iter()
        .map(|s| s["start"].as_str().unwrap().parse().unwrap())
        .collect();

    // A 60 minute service cannot start from 11:30 through 12:30.
    let lunchtime = date.and_hms_opt(11, 30, 0).unwrap().and_utc();
    let after = date.and_hms_opt(13, 0, 0).unwrap().and_utc();
    assert!(!starts.contains(&lunchtime));
    assert!(!starts.contains(&date.and_hms_opt(12, 0, 0).unwrap().and_utc()));
    assert!(starts.contains(&after));
    assert!(starts.contains(&date.and_hms_opt(11, 0, 0).unwrap().and_utc()));
}

#[tokio::test]
async fn test_min_notice_marks_near_slots() {
    let app = TestApp::new().await;
    // Three days of notice; a day two days out is inside the window.
    let svc = setup(&app, "c1", json!({"min_notice_min": 3 * 1440})).await;

    let body = get_day(&app, "c1", &svc, in_days(2)).await;
    let slots = body["slots"].as_array().unwrap();
    assert!(!slots.is_empty());
    assert!(slots.iter().all(|s| s["available"] == false));
    assert!(slots.iter().all(|s| s["reason"] == "notice"));

    let body = get_day(&app, "c1", &svc, in_days(5)).await;
    assert!(body["slots"].as_array().unwrap().iter().all(|s| s["available"] == true));
}

#[tokio::test]
async fn test_range_availability_summarises_days() {
    let app = TestApp::new().await;
    let blackout = in_days(3);
    let svc = setup(&app, "c1", json!({"blackout_dates": [blackout.to_string()]})).await;

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/c1/availability")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({
                "service_id": svc,
                "start_date": in_days(2).to_string(),
                "end_date": in_days(4).to_string()
            }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    let days = body["days"].as_array().unwrap();
    assert_eq!(days.len(), 3);
    assert_eq!(days[0]["open_slots"], 15);
    assert_eq!(days[1]["date"], blackout.to_string());
    assert_eq!(days[1]["total_slots"], 0);
    assert_eq!(days[2]["open_slots"], 15);
}

#[tokio::test]
async fn test_range_availability_rejects_inverted_range() {
    let app = TestApp::new().await;
    let svc = setup(&app, "c1", json!({})).await;

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri("/api/v1/c1/availability")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({
                "service_id": svc,
                "start_date": in_days(5).to_string(),
                "end_date": in_days(2).to_string()
            }).to_string())).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_availability_for_unknown_service_is_404() {
    let app = TestApp::new().await;
    setup(&app, "c1", json!({})).await;

    let res = app.router.clone().oneshot(
        Request::builder().method("GET")
            .uri(format!("/api/v1/c1/availability?service_id=nope&date={}", in_days(2)))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
