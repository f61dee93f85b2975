//! Redis-backed queue store.
//!
//! Queues are Redis lists used left-in/right-out: producers `LPUSH`, the
//! mover drains with `RPOP` and re-publishes whole batches with a single
//! multi-value `LPUSH`. Pushing a batch in pop order keeps the oldest item
//! rightmost in the destination list, so per-shard FIFO order survives the
//! move.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::{QueueStore, StoreError};

/// Connection settings for one side of the move.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Comma-separated `host:port` nodes. The first node that accepts a
    /// connection is used; the rest are startup fallbacks.
    pub nodes: String,
    /// Time bound applied to connect and to every pop/push call.
    pub timeout: Duration,
    /// Optional AUTH password.
    pub password: Option<String>,
}

impl StoreConfig {
    /// Builds one `redis://` URL per configured node.
    fn urls(&self) -> Vec<String> {
        self.nodes
            .split(',')
            .map(str::trim)
            .filter(|node| !node.is_empty())
            .map(|node| match &self.password {
                Some(password) => format!("redis://:{password}@{node}"),
                None => format!("redis://{node}"),
            })
            .collect()
    }
}

/// A queue store talking to a single Redis node.
///
/// The underlying [`ConnectionManager`] reconnects on its own after
/// transient failures, so one store handle serves a worker for its whole
/// lifetime.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    timeout: Duration,
}

impl RedisStore {
    /// Connects to the first reachable node in `config`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Connection` when no node accepts a connection,
    /// or `StoreError::Timeout` when the last attempt exceeded the
    /// configured bound.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut last_error = StoreError::Connection("no store nodes configured".to_string());

        for url in config.urls() {
            let client = match redis::Client::open(url.as_str()) {
                Ok(client) => client,
                Err(e) => {
                    last_error = StoreError::Connection(e.to_string());
                    continue;
                }
            };
            match tokio::time::timeout(config.timeout, ConnectionManager::new(client)).await {
                Ok(Ok(conn)) => {
                    return Ok(Self {
                        conn,
                        timeout: config.timeout,
                    })
                }
                Ok(Err(e)) => last_error = StoreError::Connection(e.to_string()),
                Err(_) => last_error = StoreError::Timeout(config.timeout),
            }
        }

        Err(last_error)
    }
}

#[async_trait]
impl QueueStore for RedisStore {
    async fn pop(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut conn = self.conn.clone();
        match tokio::time::timeout(self.timeout, conn.rpop::<_, Option<Vec<u8>>>(key, None)).await
        {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(StoreError::Command(e.to_string())),
            Err(_) => Err(StoreError::Timeout(self.timeout)),
        }
    }

    async fn push(&self, key: &str, items: &[Vec<u8>]) -> Result<(), StoreError> {
        if items.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn.clone();
        match tokio::time::timeout(self.timeout, conn.lpush::<_, _, ()>(key, items)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(StoreError::Command(e.to_string())),
            Err(_) => Err(StoreError::Timeout(self.timeout)),
        }
    }
}
