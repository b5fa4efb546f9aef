use crate::models::ServiceTarget;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    #[serde(default = "default_services")]
    pub services: Vec<ServiceTarget>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_host")]
    pub host: String,
    #[serde(default = "default_redis_port")]
    pub port: u16,
    /// When false no store client is created; queue and store stats stay zeroed.
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_store_timeout_ms")]
    pub ping_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// Key prefix of the job queue; counters live at `{prefix}:repeat|completed|failed`.
    #[serde(default = "default_queue_prefix")]
    pub prefix: String,
    /// Overall deadline for the three counter queries of one cycle.
    #[serde(default = "default_store_timeout_ms")]
    pub deadline_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default = "default_collect_interval_ms")]
    pub collect_interval_ms: u64,
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    /// How often to log collector stats (cycles completed, last cycle duration) at INFO level.
    #[serde(default = "default_stats_log_interval_secs")]
    pub stats_log_interval_secs: u64,
}

fn default_port() -> u16 {
    8080
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_redis_host() -> String {
    "localhost".into()
}

fn default_redis_port() -> u16 {
    6379
}

fn default_true() -> bool {
    true
}

fn default_store_timeout_ms() -> u64 {
    2000
}

fn default_queue_prefix() -> String {
    "bull:cron-jobs".into()
}

fn default_collect_interval_ms() -> u64 {
    5000
}

fn default_probe_timeout_ms() -> u64 {
    3000
}

fn default_stats_log_interval_secs() -> u64 {
    60
}

fn default_services() -> Vec<ServiceTarget> {
    vec![
        ServiceTarget::new("Frontend", "http://localhost:3000"),
        ServiceTarget::new("Backend", "http://localhost:4000/health"),
        ServiceTarget::new("Notification", "http://localhost:3001/health"),
    ]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: default_redis_host(),
            port: default_redis_port(),
            enabled: true,
            ping_timeout_ms: default_store_timeout_ms(),
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            prefix: default_queue_prefix(),
            deadline_ms: default_store_timeout_ms(),
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            collect_interval_ms: default_collect_interval_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
            stats_log_interval_secs: default_stats_log_interval_secs(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            redis: RedisConfig::default(),
            queue: QueueConfig::default(),
            monitoring: MonitoringConfig::default(),
            services: default_services(),
        }
    }
}

/// Environment variables that override a single service URL, by service name.
const SERVICE_URL_VARS: [(&str, &str); 3] = [
    ("Frontend", "FRONTEND_URL"),
    ("Backend", "BACKEND_URL"),
    ("Notification", "NOTIFICATION_URL"),
];

impl AppConfig {
    /// Reads `CONFIG_FILE` (default `config.toml`) when present, otherwise starts
    /// from defaults; then applies environment overrides and validates.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        Self::load_from_path(Path::new(&path), |key| std::env::var(key).ok())
    }

    /// Like [`load`](Self::load), with an explicit file and variable lookup.
    /// A missing file means defaults; an unreadable or malformed one is an error.
    pub fn load_from_path<F>(path: &Path, lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match std::fs::read_to_string(path) {
            Ok(s) => toml::from_str(&s)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file; using defaults");
                AppConfig::default()
            }
            Err(e) => return Err(anyhow::anyhow!("read {}: {}", path.display(), e)),
        };
        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (normally the process environment). Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(port) = get("MONITOR_PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| anyhow::anyhow!("MONITOR_PORT={:?}: {}", port, e))?;
        }
        if let Some(host) = get("REDIS_HOST") {
            self.redis.host = host;
        }
        if let Some(port) = get("REDIS_PORT") {
            self.redis.port = port
                .parse()
                .map_err(|e| anyhow::anyhow!("REDIS_PORT={:?}: {}", port, e))?;
        }
        if let Some(prefix) = get("QUEUE_PREFIX") {
            self.queue.prefix = prefix;
        }
        for (name, var) in SERVICE_URL_VARS {
            if let Some(url) = get(var)
                && let Some(target) = self.services.iter_mut().find(|t| t.name == name)
            {
                target.url = url;
            }
        }
        Ok(())
    }

    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/0", self.redis.host, self.redis.port)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.redis.host.is_empty(),
            "redis.host must be non-empty"
        );
        anyhow::ensure!(
            self.redis.ping_timeout_ms > 0,
            "redis.ping_timeout_ms must be > 0, got {}",
            self.redis.ping_timeout_ms
        );
        anyhow::ensure!(
            !self.queue.prefix.is_empty(),
            "queue.prefix must be non-empty"
        );
        let interval = self.monitoring.collect_interval_ms;
        anyhow::ensure!(
            interval > 0,
            "monitoring.collect_interval_ms must be > 0, got {}",
            interval
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        anyhow::ensure!(
            self.monitoring.probe_timeout_ms > 0 && self.monitoring.probe_timeout_ms < interval,
            "monitoring.probe_timeout_ms must be > 0 and < collect_interval_ms ({}), got {}",
            interval,
            self.monitoring.probe_timeout_ms
        );
        anyhow::ensure!(
            self.queue.deadline_ms > 0 && self.queue.deadline_ms < interval,
            "queue.deadline_ms must be > 0 and < collect_interval_ms ({}), got {}",
            interval,
            self.queue.deadline_ms
        );
        anyhow::ensure!(
            self.redis.ping_timeout_ms < interval,
            "redis.ping_timeout_ms must be < collect_interval_ms ({}), got {}",
            interval,
            self.redis.ping_timeout_ms
        );
        let mut seen = std::collections::HashSet::new();
        for target in &self.services {
            anyhow::ensure!(
                !target.name.is_empty(),
                "services: name must be non-empty (url {})",
                target.url
            );
            anyhow::ensure!(
                seen.insert(target.name.as_str()),
                "services: duplicate name {:?}",
                target.name
            );
            anyhow::ensure!(
                target.url.starts_with("http://") || target.url.starts_with("https://"),
                "services.{}: url must start with http:// or https://, got {:?}",
                target.name,
                target.url
            );
        }
        Ok(())
    }
}
