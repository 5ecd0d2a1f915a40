//! Integration tests for the observer API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. This validates handler logic and routing
//! without needing a live network connection.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use serde_json::Value;
use telemon_core::echo::echo_channel;
use telemon_server::hub::{hub_channel, run_hub};
use telemon_server::router::build_router;
use telemon_server::state::AppState;
use telemon_types::{MeasurementKind, Snapshot};
use tower::ServiceExt;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn sample_snapshot() -> Snapshot {
    let mut snap = Snapshot::new(Utc::now());
    snap.record("cave", MeasurementKind::Humidity, 41.5);
    snap.record("cave", MeasurementKind::Temperature, 19.25);
    snap
}

/// State backed by a stub aggregator that answers every echo request
/// with a fixed snapshot.
fn make_answering_state() -> Arc<AppState> {
    let (hub, inbox) = hub_channel();
    tokio::spawn(run_hub(inbox));

    let (echo, mut echo_rx) = echo_channel(POLL_INTERVAL * 2);
    tokio::spawn(async move {
        while let Some(reply) = echo_rx.recv().await {
            let _ = reply.send(sample_snapshot());
        }
    });

    AppState::new(hub, echo, POLL_INTERVAL)
}

/// State whose aggregator parks every echo request without answering,
/// as happens before the first snapshot ever arrives.
fn make_silent_state() -> Arc<AppState> {
    let (hub, inbox) = hub_channel();
    tokio::spawn(run_hub(inbox));

    let (echo, mut echo_rx) = echo_channel(POLL_INTERVAL * 2);
    tokio::spawn(async move {
        let mut parked = Vec::new();
        while let Some(reply) = echo_rx.recv().await {
            parked.push(reply);
        }
    });

    AppState::new(hub, echo, POLL_INTERVAL)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn index_serves_the_status_page() {
    let router = build_router(make_answering_state());

    let response = router
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Telemon"));
    assert!(html.contains("/echo"));
}

#[tokio::test]
async fn echo_returns_the_latest_snapshot_as_json() {
    let router = build_router(make_answering_state());

    let response = router
        .oneshot(Request::get("/echo").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["sensors"][0]["name"], "cave");
    assert_eq!(json["sensors"][0]["type"], "humidity");
    assert_eq!(json["labels"]["cave"][1], "temperature");
}

#[tokio::test]
async fn echo_times_out_with_504_when_no_snapshot_exists() {
    let router = build_router(make_silent_state());

    let response = router
        .oneshot(Request::get("/echo").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 504);
    assert!(json["error"].as_str().unwrap().contains("timed out"));
}

#[tokio::test]
async fn unknown_route_is_404() {
    let router = build_router(make_answering_state());

    let response = router
        .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
