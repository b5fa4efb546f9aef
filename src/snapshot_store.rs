// Latest-snapshot store: one writer (the collector), any number of readers

use crate::models::Snapshot;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Holds the most recently published [`Snapshot`]. Clones share the same slot.
///
/// Writes swap an `Arc`, so the write lock is held only for a pointer store, and
/// reads clone that `Arc` under a shared lock. A reader therefore sees either the
/// whole previous snapshot or the whole new one.
#[derive(Clone, Default)]
pub struct SnapshotStore {
    current: Arc<RwLock<Arc<Snapshot>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest snapshot, or an empty one (cycle 0) before the first write.
    pub async fn read(&self) -> Arc<Snapshot> {
        self.current.read().await.clone()
    }

    /// Publish `snapshot`, superseding the previous one.
    pub async fn write(&self, snapshot: Snapshot) {
        let next = Arc::new(snapshot);
        let previous = {
            let mut slot = self.current.write().await;
            std::mem::replace(&mut *slot, next)
        };
        // Dropped outside the lock; readers may still hold it.
        drop(previous);
    }
}
