// Background collector: one cycle per tick (sample + probe + inspect), published as one snapshot.
// Cycles never overlap; a slow cycle delays the next tick instead of queueing ticks.

use crate::config::AppConfig;
use crate::inspector::{QueueInspector, StoreProbe};
use crate::models::{ServiceTarget, Snapshot, Status};
use crate::prober::ServiceProber;
use crate::sampler::ResourceSampler;
use crate::snapshot_store::SnapshotStore;
use std::time::Instant;
use tokio::sync::oneshot;
use tokio::time::{Duration, MissedTickBehavior, interval, interval_at};
use tracing::Instrument;

/// Sources and sink for the collector.
pub struct CollectorDeps {
    pub sampler: ResourceSampler,
    pub prober: ServiceProber,
    pub queue_inspector: QueueInspector,
    pub store_probe: StoreProbe,
    pub snapshots: SnapshotStore,
    /// Process start; uptime is measured from here.
    pub started_at: Instant,
}

/// Collector timing and targets.
pub struct CollectorConfig {
    pub services: Vec<ServiceTarget>,
    pub collect_interval_ms: u64,
    pub probe_timeout_ms: u64,
    /// How often to log collector stats (real seconds).
    pub stats_log_interval_secs: u64,
}

impl CollectorConfig {
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            services: config.services.clone(),
            collect_interval_ms: config.monitoring.collect_interval_ms,
            probe_timeout_ms: config.monitoring.probe_timeout_ms,
            stats_log_interval_secs: config.monitoring.stats_log_interval_secs,
        }
    }
}

pub struct Collector {
    deps: CollectorDeps,
    services: Vec<ServiceTarget>,
    probe_timeout: Duration,
    cycles_completed: u64,
    /// Last observed store reachability, for logging transitions only.
    store_connected: Option<bool>,
}

impl Collector {
    pub fn new(deps: CollectorDeps, config: &CollectorConfig) -> Self {
        Self {
            deps,
            services: config.services.clone(),
            probe_timeout: Duration::from_millis(config.probe_timeout_ms),
            cycles_completed: 0,
            store_connected: None,
        }
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed
    }

    /// Run one cycle and publish its snapshot. Every source degrades to defaults on
    /// failure, so this always publishes. Returns the published cycle number.
    pub async fn run_cycle(&mut self) -> u64 {
        let deps = &self.deps;
        let (system, services, queue, redis) = tokio::join!(
            deps.sampler.sample_blocking(deps.started_at),
            deps.prober.probe_all(&self.services, self.probe_timeout),
            deps.queue_inspector.inspect(),
            deps.store_probe.stats(),
        );

        let down = services.iter().filter(|s| s.status == Status::Down).count();
        if down > 0 {
            tracing::debug!(down, total = services.len(), "services unreachable this cycle");
        }
        if self.deps.store_probe.is_configured() {
            self.note_store_state(redis.connected);
        }

        self.cycles_completed += 1;
        let snapshot = Snapshot {
            cycle: self.cycles_completed,
            system,
            services,
            queue,
            redis,
        };
        self.deps.snapshots.write(snapshot).await;
        self.cycles_completed
    }

    fn note_store_state(&mut self, connected: bool) {
        if self.store_connected == Some(connected) {
            return;
        }
        match (self.store_connected, connected) {
            (_, true) => tracing::info!(operation = "store_ping", "store connected"),
            (Some(true), false) => {
                tracing::warn!(operation = "store_ping", "store unreachable; queue stats zeroed")
            }
            (None, false) => {
                tracing::warn!(operation = "store_ping", "store not reachable at startup")
            }
            (Some(false), false) => {}
        }
        self.store_connected = Some(connected);
    }
}

/// Spawns the collector loop. It stops when `shutdown_rx` fires or its sender is dropped;
/// a cycle already in progress finishes first.
pub fn spawn(
    deps: CollectorDeps,
    config: CollectorConfig,
    mut shutdown_rx: oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    let period = Duration::from_millis(config.collect_interval_ms);
    let stats_log_interval = Duration::from_secs(config.stats_log_interval_secs);
    let span = tracing::span!(
        tracing::Level::DEBUG,
        "collector",
        collect_interval_ms = config.collect_interval_ms
    );

    tokio::spawn(
        async move {
            let mut collector = Collector::new(deps, &config);
            let mut tick = interval(period);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut stats_log_tick =
                interval_at(tokio::time::Instant::now() + stats_log_interval, stats_log_interval);
            stats_log_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

            let mut last_cycle = Duration::ZERO;

            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        let started = Instant::now();
                        collector.run_cycle().await;
                        last_cycle = started.elapsed();
                        if last_cycle > period {
                            tracing::warn!(
                                cycle_ms = last_cycle.as_millis() as u64,
                                interval_ms = config.collect_interval_ms,
                                "collection cycle overran its interval; next tick delayed"
                            );
                        }
                    }
                    _ = &mut shutdown_rx => {
                        tracing::debug!("Collector shutting down");
                        break;
                    }
                    _ = stats_log_tick.tick() => {
                        tracing::info!(
                            cycles_completed = collector.cycles_completed(),
                            last_cycle_ms = last_cycle.as_millis() as u64,
                            "collector stats"
                        );
                    }
                }
            }
        }
        .instrument(span),
    )
}
