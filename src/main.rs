use anyhow::{Context, Result};
use opsmonitor::*;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let started_at = Instant::now();
    let app_config = config::AppConfig::load()?;

    let store: inspector::SharedStore = if app_config.redis.enabled {
        let repo: Arc<dyn redis_repo::JobStore> = Arc::new(redis_repo::RedisRepo::open(
            &app_config.redis_url(),
            Duration::from_millis(app_config.redis.ping_timeout_ms),
        )?);
        Some(repo)
    } else {
        tracing::info!("Store disabled; queue and store stats will stay zeroed");
        None
    };

    let snapshots = snapshot_store::SnapshotStore::new();
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let collector_handle = collector::spawn(
        collector::CollectorDeps {
            sampler: sampler::ResourceSampler::new(),
            prober: prober::ServiceProber::new()?,
            queue_inspector: inspector::QueueInspector::new(
                store.clone(),
                inspector::QueueKeys::with_prefix(&app_config.queue.prefix),
                Duration::from_millis(app_config.queue.deadline_ms),
            ),
            store_probe: inspector::StoreProbe::new(
                store,
                Duration::from_millis(app_config.redis.ping_timeout_ms),
            ),
            snapshots: snapshots.clone(),
            started_at,
        },
        collector::CollectorConfig::from_app(&app_config),
        shutdown_rx,
    );

    let app = routes::app(snapshots, started_at);
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {}", addr))?;
    tracing::info!(
        services = app_config.services.len(),
        "Listening on http://{}",
        addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Received shutdown signal");
    let _ = shutdown_tx.send(());
    let _ = collector_handle.await;
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
