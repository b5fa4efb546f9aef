// Job queue counters and key-value store health

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueStats {
    #[serde(rename = "active")]
    pub active_count: i64,
    #[serde(rename = "completed")]
    pub completed_count: i64,
    #[serde(rename = "failed")]
    pub failed_count: i64,
    #[serde(rename = "success_rate")]
    pub success_rate_percent: f64,
}

impl QueueStats {
    /// Build stats from raw counters, deriving the success rate.
    pub fn from_counts(active: i64, completed: i64, failed: i64) -> Self {
        Self {
            active_count: active,
            completed_count: completed,
            failed_count: failed,
            success_rate_percent: success_rate(completed, failed),
        }
    }
}

/// completed / (completed + failed) * 100, or 0 when nothing has finished.
/// Negative counters are treated as 0 so the result stays within 0..=100.
pub fn success_rate(completed: i64, failed: i64) -> f64 {
    let completed = completed.max(0);
    let total = completed + failed.max(0);
    if total == 0 {
        return 0.0;
    }
    completed as f64 / total as f64 * 100.0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    pub connected: bool,
    #[serde(rename = "keys")]
    pub key_count: i64,
    pub ping_ms: i64,
}
