// HTTP routes

mod http;

use axum::{Router, http::Method, http::header, routing::get};
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};

use crate::snapshot_store::SnapshotStore;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) snapshots: SnapshotStore,
    pub(crate) started_at: Instant,
}

pub fn app(snapshots: SnapshotStore, started_at: Instant) -> Router {
    let state = AppState {
        snapshots,
        started_at,
    };
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);
    Router::new()
        .route("/", get(http::dashboard_handler)) // GET /
        .route("/metrics", get(http::metrics_handler)) // GET /metrics
        .route("/health", get(http::health_handler)) // GET /health
        .route("/version", get(http::version_handler)) // GET /version
        .layer(cors)
        .with_state(state)
}
