// Job queue counters and store health, read from the shared store handle

use crate::models::{QueueStats, StoreStats};
use crate::redis_repo::{JobStore, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, timeout_at};

/// Shared, long-lived store handle. `None` means no store is configured.
pub type SharedStore = Option<Arc<dyn JobStore>>;

/// Keys of the three sorted sets that make up a job queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueKeys {
    pub active: String,
    pub completed: String,
    pub failed: String,
}

impl QueueKeys {
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            active: format!("{prefix}:repeat"),
            completed: format!("{prefix}:completed"),
            failed: format!("{prefix}:failed"),
        }
    }
}

/// Reads active/completed/failed counts. Each counter degrades to 0 on its own.
pub struct QueueInspector {
    store: SharedStore,
    keys: QueueKeys,
    deadline: Duration,
}

impl QueueInspector {
    pub fn new(store: SharedStore, keys: QueueKeys, deadline: Duration) -> Self {
        Self {
            store,
            keys,
            deadline,
        }
    }

    /// Inspect with the configured overall deadline.
    pub async fn inspect(&self) -> QueueStats {
        self.inspect_until(Instant::now() + self.deadline).await
    }

    /// The three queries run concurrently; any still pending at `deadline` count as 0.
    pub async fn inspect_until(&self, deadline: Instant) -> QueueStats {
        let Some(store) = self.store.as_deref() else {
            return QueueStats::default();
        };
        let (active, completed, failed) = tokio::join!(
            count(store, &self.keys.active, deadline),
            count(store, &self.keys.completed, deadline),
            count(store, &self.keys.failed, deadline),
        );
        QueueStats::from_counts(active, completed, failed)
    }
}

async fn count(store: &dyn JobStore, key: &str, deadline: Instant) -> i64 {
    match bounded(deadline, store.set_len(key)).await {
        Ok(n) => n,
        Err(e) => {
            tracing::debug!(error = %e, key, operation = "set_len", "queue counter unavailable");
            0
        }
    }
}

/// Pings the store and counts its keys, each bounded by the same timeout.
pub struct StoreProbe {
    store: SharedStore,
    timeout: Duration,
}

impl StoreProbe {
    pub fn new(store: SharedStore, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_some()
    }

    pub async fn stats(&self) -> StoreStats {
        let Some(store) = self.store.as_deref() else {
            return StoreStats::default();
        };
        let deadline = Instant::now() + self.timeout;
        let start = std::time::Instant::now();
        let connected = match bounded(deadline, store.ping()).await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, operation = "ping", "store ping failed");
                false
            }
        };
        let ping_ms = start.elapsed().as_millis().min(i64::MAX as u128) as i64;
        let key_count = if connected {
            bounded(deadline, store.key_count())
                .await
                .unwrap_or_else(|e| {
                    tracing::debug!(error = %e, operation = "key_count", "store key count failed");
                    0
                })
        } else {
            0
        };
        StoreStats {
            connected,
            key_count,
            ping_ms,
        }
    }
}

async fn bounded<T, F>(deadline: Instant, call: F) -> Result<T, StoreError>
where
    F: std::future::Future<Output = Result<T, StoreError>>,
{
    let budget = deadline.saturating_duration_since(Instant::now());
    timeout_at(deadline, call)
        .await
        .map_err(|_| StoreError::Timeout(budget))?
}
