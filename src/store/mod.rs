//! Queue store capabilities.
//!
//! The mover consumes its stores through exactly two operations: pop one
//! item from the tail of a keyed FIFO queue, and push an ordered batch onto
//! it. Everything else about the store (clustering, persistence, eviction)
//! is the client's concern.

mod memory;
mod redis;

pub use memory::MemoryStore;
pub use redis::{RedisStore, StoreConfig};

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from store operations.
///
/// All variants are transient from the mover's point of view except
/// connection failures at worker startup, which are fatal for that worker.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Failed to establish a connection to any configured node.
    #[error("store connection failed: {0}")]
    Connection(String),

    /// A pop or push call exceeded its configured time bound.
    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    /// The store rejected or failed the command.
    #[error("store command failed: {0}")]
    Command(String),
}

/// A sharded FIFO queue store.
///
/// `pop` removes and returns the oldest item under `key`, or `None` when
/// the queue is empty. `push` appends `items` so that a consumer popping
/// from the destination observes them in slice order. Implementations must
/// deliver the whole batch or fail it; partial application is allowed only
/// if a retry of the same batch cannot reorder items (at-least-once
/// delivery, never reordering).
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Pops the oldest item from the queue at `key`.
    async fn pop(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Appends an ordered batch to the queue at `key`.
    async fn push(&self, key: &str, items: &[Vec<u8>]) -> Result<(), StoreError>;
}
