// Process resource sampling via sysinfo and tokio runtime metrics

use crate::format::format_duration;
use crate::models::SystemStats;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

/// Live tasks are divided by this to produce the `cpu_percent` load proxy.
const TASKS_PER_LOAD_UNIT: f64 = 10.0;

/// Samples this process's load and memory. Cheap to clone; clones share the sysinfo handle.
#[derive(Clone)]
pub struct ResourceSampler {
    sys: Arc<Mutex<System>>,
    pid: Option<Pid>,
}

impl Default for ResourceSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceSampler {
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                tracing::warn!(error = %e, "current pid unavailable; memory_percent will read 0");
                None
            }
        };
        Self {
            sys: Arc::new(Mutex::new(System::new())),
            pid,
        }
    }

    /// Never fails: counters that cannot be read come back as 0.
    pub fn sample(&self, started_at: Instant) -> SystemStats {
        SystemStats {
            cpu_load: runtime_load(),
            memory_used_percent: self.memory_used_percent(),
            uptime: format_duration(started_at.elapsed()),
            updated_at: chrono::Local::now().format("%H:%M:%S").to_string(),
        }
    }

    /// Same as [`sample`](Self::sample), off the async worker threads.
    pub async fn sample_blocking(&self, started_at: Instant) -> SystemStats {
        let sampler = self.clone();
        match tokio::task::spawn_blocking(move || sampler.sample(started_at)).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!(error = %e, operation = "sample", "sampler task join failed");
                SystemStats {
                    uptime: format_duration(started_at.elapsed()),
                    ..SystemStats::default()
                }
            }
        }
    }

    fn memory_used_percent(&self) -> f64 {
        let Some(pid) = self.pid else {
            return 0.0;
        };
        let Ok(mut sys) = self.sys.lock() else {
            return 0.0;
        };
        sys.refresh_memory();
        sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        let total = sys.total_memory();
        let resident = sys.process(pid).map(|p| p.memory()).unwrap_or(0);
        memory_percent(resident, total)
    }
}

/// Resident / total * 100, clamped to 0..=100; 0 when total is unknown.
pub fn memory_percent(resident: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (resident as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}

/// Live tasks on the current tokio runtime / 10, or 0 outside a runtime.
fn runtime_load() -> f64 {
    tokio::runtime::Handle::try_current()
        .map(|h| h.metrics().num_alive_tasks() as f64 / TASKS_PER_LOAD_UNIT)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn memory_percent_handles_zero_total() {
        assert_eq!(memory_percent(1024, 0), 0.0);
    }

    #[test]
    fn memory_percent_is_clamped() {
        assert_eq!(memory_percent(50, 200), 25.0);
        assert_eq!(memory_percent(300, 200), 100.0);
    }

    #[test]
    fn runtime_load_outside_runtime_is_zero() {
        assert_eq!(runtime_load(), 0.0);
    }

    #[test]
    fn sample_formats_uptime_from_start() {
        let sampler = ResourceSampler::new();
        let started_at = Instant::now()
            .checked_sub(Duration::from_secs(90 * 60))
            .unwrap_or_else(Instant::now);
        let stats = sampler.sample(started_at);
        if started_at.elapsed() >= Duration::from_secs(90 * 60) {
            assert_eq!(stats.uptime, "1h");
        }
        assert!((0.0..=100.0).contains(&stats.memory_used_percent));
        assert_eq!(stats.updated_at.len(), 8);
    }

    #[tokio::test]
    async fn sample_inside_runtime_reports_non_negative_load() {
        let sampler = ResourceSampler::new();
        let stats = sampler.sample_blocking(Instant::now()).await;
        assert!(stats.cpu_load >= 0.0);
        assert_eq!(stats.uptime, "0m");
    }
}
