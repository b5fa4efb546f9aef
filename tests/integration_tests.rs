// Integration tests: HTTP endpoints over the snapshot store and a running collector

mod common;

use axum::http::{HeaderValue, header};
use axum_test::TestServer;
use common::*;
use opsmonitor::collector;
use opsmonitor::models::{QueueStats, ServiceStatus, Snapshot, Status, StoreStats};
use opsmonitor::routes;
use opsmonitor::snapshot_store::SnapshotStore;
use std::time::{Duration, Instant};

fn test_server(snapshots: SnapshotStore) -> TestServer {
    TestServer::new(routes::app(snapshots, Instant::now()))
}

#[tokio::test]
async fn test_metrics_before_first_cycle_is_empty_snapshot() {
    let server = test_server(SnapshotStore::new());
    let response = server.get("/metrics").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["cycle"], 0);
    assert_eq!(json["services"], serde_json::json!([]));
    assert_eq!(json["redis"]["connected"], false);
}

#[tokio::test]
async fn test_metrics_returns_latest_written_snapshot() {
    let snapshots = SnapshotStore::new();
    let written = Snapshot {
        cycle: 9,
        services: vec![ServiceStatus {
            name: "Backend".into(),
            url: "http://backend/health".into(),
            status: Status::Down,
            response_time_ms: 3000,
        }],
        queue: QueueStats::from_counts(1, 9, 1),
        redis: StoreStats {
            connected: true,
            key_count: 5,
            ping_ms: 2,
        },
        ..Snapshot::default()
    };
    snapshots.write(written.clone()).await;

    let server = test_server(snapshots);
    let response = server.get("/metrics").await;
    response.assert_status_ok();
    let got: Snapshot = response.json();
    assert_eq!(got, written);
    let json: serde_json::Value = response.json();
    assert_eq!(json["services"][0]["status"], "down");
    assert_eq!(json["queue"]["success_rate"], 90.0);
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = test_server(SnapshotStore::new());
    let response = server.get("/health").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["status"], "ok");
    assert!(json["uptime"].as_str().is_some_and(|s| s.ends_with('s')));
}

#[tokio::test]
async fn test_dashboard_is_html_polling_metrics() {
    let server = test_server(SnapshotStore::new());
    let response = server.get("/").await;
    response.assert_status_ok();
    let content_type = response.header("content-type");
    assert!(content_type.to_str().unwrap().starts_with("text/html"));
    let body = response.text();
    assert!(body.contains("fetch('/metrics')"));
    assert!(body.contains("setInterval"));
}

#[tokio::test]
async fn test_version_endpoint() {
    let server = test_server(SnapshotStore::new());
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(
        json.get("name").and_then(|v| v.as_str()),
        Some("opsmonitor")
    );
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let server = test_server(SnapshotStore::new());
    let response = server
        .get("/metrics")
        .add_header(
            header::ORIGIN,
            HeaderValue::from_static("http://elsewhere.example"),
        )
        .await;
    response.assert_status_ok();
    assert_eq!(response.header("access-control-allow-origin"), "*");
}

#[tokio::test]
async fn test_metrics_stays_200_with_store_down() {
    let services = three_services(200).await;
    let snapshots = SnapshotStore::new();
    let mut collector = build_collector(None, snapshots.clone(), services);
    collector.run_cycle().await;

    let server = test_server(snapshots);
    let response = server.get("/metrics").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["redis"]["connected"], false);
    assert_eq!(json["redis"]["keys"], 0);
    assert_eq!(json["queue"]["active"], 0);
    assert_eq!(json["queue"]["success_rate"], 0.0);
}

#[tokio::test]
async fn test_end_to_end_all_healthy() {
    let services = three_services(200).await;
    let (_, store) = shared(MemoryStore::with_queue(1, 3, 1));
    let snapshots = SnapshotStore::new();
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = collector::spawn(
        collector_deps(store, snapshots.clone()),
        collector_config(services),
        shutdown_rx,
    );
    let server = test_server(snapshots);

    let deadline = Instant::now() + Duration::from_secs(3);
    let json = loop {
        let json: serde_json::Value = server.get("/metrics").await.json();
        if json["cycle"].as_u64().unwrap_or(0) > 0 {
            break json;
        }
        assert!(Instant::now() < deadline, "no cycle completed");
        tokio::time::sleep(Duration::from_millis(20)).await;
    };

    let services = json["services"].as_array().unwrap();
    assert_eq!(services.len(), 3);
    assert!(services.iter().all(|s| s["status"] == "healthy"));
    assert_eq!(json["queue"]["success_rate"], 75.0);
    assert_eq!(json["redis"]["connected"], true);

    let _ = shutdown_tx.send(());
    handle.await.unwrap();
}
