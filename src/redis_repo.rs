// Key-value store access: the narrow contract the collector needs, and its Redis implementation

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::time::Duration;
use tokio::sync::OnceCell;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
    #[error("store command failed: {0}")]
    Command(#[from] redis::RedisError),
}

/// What the collector asks of the store. Implementations must be safe to call
/// concurrently; one handle is shared for the whole process lifetime.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    /// Number of keys in the selected database.
    async fn key_count(&self) -> Result<i64, StoreError>;

    /// Cardinality of the sorted set at `key` (0 when the key does not exist).
    async fn set_len(&self, key: &str) -> Result<i64, StoreError>;
}

/// Redis-backed [`JobStore`]. The connection is established on first use and then
/// shared; the connection manager reconnects on its own after a drop. A failed first
/// connect leaves the cell empty so the next call tries again.
pub struct RedisRepo {
    client: redis::Client,
    conn: OnceCell<ConnectionManager>,
    connect_timeout: Duration,
}

impl RedisRepo {
    /// Parses `url`; does not touch the network.
    pub fn open(url: &str, connect_timeout: Duration) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        Ok(Self {
            client,
            conn: OnceCell::new(),
            connect_timeout,
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, StoreError> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                match tokio::time::timeout(
                    self.connect_timeout,
                    ConnectionManager::new(self.client.clone()),
                )
                .await
                {
                    Ok(Ok(conn)) => {
                        tracing::debug!(operation = "connect", "store connection established");
                        Ok(conn)
                    }
                    Ok(Err(e)) => Err(StoreError::Unavailable(e.to_string())),
                    Err(_) => Err(StoreError::Timeout(self.connect_timeout)),
                }
            })
            .await?;
        Ok(conn.clone())
    }
}

#[async_trait]
impl JobStore for RedisRepo {
    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn key_count(&self) -> Result<i64, StoreError> {
        let mut conn = self.connection().await?;
        let n: i64 = redis::cmd("DBSIZE").query_async(&mut conn).await?;
        Ok(n)
    }

    async fn set_len(&self, key: &str) -> Result<i64, StoreError> {
        let mut conn = self.connection().await?;
        let n: i64 = redis::cmd("ZCARD").arg(key).query_async(&mut conn).await?;
        Ok(n)
    }
}
