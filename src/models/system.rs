// Process resource stats

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemStats {
    /// Live runtime tasks / 10. A load proxy, not OS CPU utilisation.
    #[serde(rename = "cpu_percent")]
    pub cpu_load: f64,
    /// Process resident memory as a share of total system memory, 0..=100.
    #[serde(rename = "memory_percent")]
    pub memory_used_percent: f64,
    pub uptime: String,
    /// Local wall-clock time (HH:MM:SS) the sample was taken.
    #[serde(rename = "updated")]
    pub updated_at: String,
}
