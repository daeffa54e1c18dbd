use agriview_api::models::*;
use agriview_server::tests::*;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::mock_app::MockApp;

#[tokio::test]
async fn test_farm_unavailable_before_first_snapshot() {
    let app = MockApp::new().await;

    let (status, body) = app.send(Method::GET, "/api/farm", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], 503);
}

#[tokio::test]
async fn test_farm_snapshot() {
    let app = MockApp::new().await;
    app.channel.push_devices(&create_test_devices()).await;
    app.channel
        .push_readings(&SensorReadings {
            temperature: Some(24.5),
            soil_moisture: Some(38.0),
            ..Default::default()
        })
        .await;
    app.channel
        .push("system", json!({ "status": "online", "rssi": -61 }))
        .await;

    let (status, body) = app.send(Method::GET, "/api/farm", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["devices"]["ventAngle"], 45);
    assert_eq!(body["sensorData"]["temperature"], 24.5);
    assert_eq!(body["system"]["status"], "online");
}

#[tokio::test]
async fn test_history_limit() {
    let app = MockApp::new().await;
    let panel = &app.services.panel;

    for angle in [10, 20, 30] {
        panel
            .dispatch("ventAngle", json!(angle), CommandSource::Manual)
            .await
            .unwrap();
    }

    let (status, body) = app.send(Method::GET, "/api/farm/history?limit=2", None).await;
    assert_eq!(status, StatusCode::OK);

    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["value"], 30);
    assert_eq!(entries[1]["value"], 20);
}

#[tokio::test]
async fn test_event_stream() {
    let app = MockApp::new().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/events")
                .method(Method::GET)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");
}
