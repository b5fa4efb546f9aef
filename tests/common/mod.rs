// Shared test helpers: in-memory store, local probe targets, collector wiring

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{Router, http::StatusCode, routing::get};
use opsmonitor::collector::{Collector, CollectorConfig, CollectorDeps};
use opsmonitor::inspector::{QueueInspector, QueueKeys, SharedStore, StoreProbe};
use opsmonitor::models::ServiceTarget;
use opsmonitor::prober::ServiceProber;
use opsmonitor::redis_repo::{JobStore, StoreError};
use opsmonitor::sampler::ResourceSampler;
use opsmonitor::snapshot_store::SnapshotStore;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

pub const QUEUE_PREFIX: &str = "bull:cron-jobs";

/// In-memory [`JobStore`]. Every call sleeps `delay` first; `down` makes every call fail.
#[derive(Default)]
pub struct MemoryStore {
    pub sets: HashMap<String, i64>,
    pub keys: i64,
    pub down: bool,
    /// Keys whose `set_len` fails even when the store is up.
    pub failing_keys: Vec<String>,
    pub delay: Duration,
    pub pings: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl MemoryStore {
    /// Queue with the given counters under [`QUEUE_PREFIX`].
    pub fn with_queue(active: i64, completed: i64, failed: i64) -> Self {
        let keys = QueueKeys::with_prefix(QUEUE_PREFIX);
        let mut sets = HashMap::new();
        sets.insert(keys.active, active);
        sets.insert(keys.completed, completed);
        sets.insert(keys.failed, failed);
        Self {
            keys: 3,
            sets,
            ..Default::default()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            down: true,
            ..Default::default()
        }
    }

    async fn call(&self) -> Result<(), StoreError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.down {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.pings.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let result = self.call().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn key_count(&self) -> Result<i64, StoreError> {
        self.call().await?;
        Ok(self.keys)
    }

    async fn set_len(&self, key: &str) -> Result<i64, StoreError> {
        self.call().await?;
        if self.failing_keys.iter().any(|k| k == key) {
            return Err(StoreError::Unavailable(format!("{key} failed")));
        }
        Ok(self.sets.get(key).copied().unwrap_or(0))
    }
}

pub fn shared(store: MemoryStore) -> (Arc<MemoryStore>, SharedStore) {
    let store = Arc::new(store);
    let handle: Arc<dyn JobStore> = store.clone();
    (store, Some(handle))
}

/// Serve `router` on an ephemeral loopback port; returns its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}")
}

/// Server answering every GET / with `code`.
pub async fn status_server(code: u16) -> String {
    let status = StatusCode::from_u16(code).unwrap();
    spawn_server(Router::new().route("/", get(move || async move { status }))).await
}

/// Server that accepts connections but never answers.
pub async fn hanging_server() -> String {
    spawn_server(Router::new().route(
        "/",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            "late"
        }),
    ))
    .await
}

/// URL of a loopback port with nothing listening.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn collector_config(services: Vec<ServiceTarget>) -> CollectorConfig {
    CollectorConfig {
        services,
        collect_interval_ms: 1000,
        probe_timeout_ms: 500,
        stats_log_interval_secs: 3600,
    }
}

pub fn collector_deps(store: SharedStore, snapshots: SnapshotStore) -> CollectorDeps {
    CollectorDeps {
        sampler: ResourceSampler::new(),
        prober: ServiceProber::new().unwrap(),
        queue_inspector: QueueInspector::new(
            store.clone(),
            QueueKeys::with_prefix(QUEUE_PREFIX),
            Duration::from_millis(300),
        ),
        store_probe: StoreProbe::new(store, Duration::from_millis(300)),
        snapshots,
        started_at: Instant::now(),
    }
}

pub fn build_collector(
    store: SharedStore,
    snapshots: SnapshotStore,
    services: Vec<ServiceTarget>,
) -> Collector {
    Collector::new(
        collector_deps(store, snapshots),
        &collector_config(services),
    )
}

/// Three targets named like the default deployment, all answering `code`.
pub async fn three_services(code: u16) -> Vec<ServiceTarget> {
    vec![
        ServiceTarget::new("Frontend", status_server(code).await),
        ServiceTarget::new("Backend", status_server(code).await),
        ServiceTarget::new("Notification", status_server(code).await),
    ]
}
