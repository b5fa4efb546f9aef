// Concurrent, bounded-timeout HTTP reachability probes

use crate::models::{ServiceStatus, ServiceTarget, Status};
use crate::version::USER_AGENT;
use futures_util::future::join_all;
use std::time::{Duration, Instant};
use tracing::instrument;

/// Probes downstream services. Holds one pooled HTTP client reused across cycles.
#[derive(Clone)]
pub struct ServiceProber {
    client: reqwest::Client,
}

impl ServiceProber {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .pool_max_idle_per_host(2)
            .build()?;
        Ok(Self { client })
    }

    /// Probe every target concurrently. The result has one entry per target,
    /// in input order, and resolves within roughly `timeout` however the targets behave.
    pub async fn probe_all(&self, targets: &[ServiceTarget], timeout: Duration) -> Vec<ServiceStatus> {
        join_all(targets.iter().map(|t| self.probe(t, timeout))).await
    }

    #[instrument(skip(self, target), fields(service = %target.name))]
    pub async fn probe(&self, target: &ServiceTarget, timeout: Duration) -> ServiceStatus {
        let start = Instant::now();
        let request = self.client.get(&target.url).timeout(timeout).send();
        let status = match tokio::time::timeout(timeout, request).await {
            Ok(Ok(resp)) => Status::from_http(resp.status().as_u16()),
            Ok(Err(e)) => {
                tracing::debug!(error = %e, url = %target.url, "probe failed");
                Status::Down
            }
            Err(_) => {
                tracing::debug!(url = %target.url, timeout_ms = timeout.as_millis() as u64, "probe timed out");
                Status::Down
            }
        };
        ServiceStatus {
            name: target.name.clone(),
            url: target.url.clone(),
            status,
            response_time_ms: start.elapsed().as_millis().min(i64::MAX as u128) as i64,
        }
    }
}
