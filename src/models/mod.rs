// Domain models: one Snapshot per collection cycle

mod queue;
mod service;
mod system;

pub use queue::{QueueStats, StoreStats, success_rate};
pub use service::{ServiceStatus, ServiceTarget, Status};
pub use system::SystemStats;

use serde::{Deserialize, Serialize};

/// Everything `/metrics` returns. Built whole by one collection cycle and
/// replaced wholesale by the next; never mutated after publication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Number of the cycle that produced this snapshot (0 = nothing collected yet).
    #[serde(default)]
    pub cycle: u64,
    pub system: SystemStats,
    pub services: Vec<ServiceStatus>,
    pub queue: QueueStats,
    pub redis: StoreStats,
}
