// GET handlers: dashboard, metrics, health, version

use axum::{extract::State, response::Html, response::IntoResponse};

use super::AppState;
use crate::format::format_elapsed;
use crate::version::{NAME, VERSION};

const DASHBOARD_HTML: &str = include_str!("dashboard.html");

/// GET / — static dashboard page; it polls /metrics itself.
pub(super) async fn dashboard_handler() -> impl IntoResponse {
    Html(DASHBOARD_HTML)
}

/// GET /metrics — latest published snapshot. Always 200; degraded sources show as zeroed fields.
pub(super) async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.snapshots.read().await;
    axum::Json(snapshot.as_ref().clone())
}

/// GET /health — liveness plus process uptime.
pub(super) async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
        "uptime": format_elapsed(state.started_at.elapsed()),
    }))
}

/// GET /version — package name and version.
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}
