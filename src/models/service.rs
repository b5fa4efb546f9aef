// Downstream service probe targets and results

use serde::{Deserialize, Serialize};

/// A named downstream HTTP endpoint, probed every cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceTarget {
    pub name: String,
    pub url: String,
}

impl ServiceTarget {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Probe outcome; serializes to lowercase JSON (e.g. "healthy").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Responded with a 2xx status.
    Healthy,
    /// Responded, but with a non-2xx status.
    Unhealthy,
    /// Connection failed or the probe timed out.
    Down,
}

impl Status {
    /// Classify an HTTP status code that was actually received.
    pub fn from_http(code: u16) -> Self {
        if (200..300).contains(&code) {
            Status::Healthy
        } else {
            Status::Unhealthy
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub name: String,
    pub url: String,
    pub status: Status,
    #[serde(rename = "response_ms")]
    pub response_time_ms: i64,
}
