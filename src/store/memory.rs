//! In-process queue store.
//!
//! Keeps the same FIFO contract as the Redis store without a network hop.
//! Used by the test suite and handy for dry runs; failure injection lets
//! tests exercise the mover's retry paths deterministically.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{QueueStore, StoreError};

#[derive(Default)]
struct Inner {
    queues: HashMap<String, VecDeque<Vec<u8>>>,
    fail_pops: u32,
    fail_pushes: u32,
}

/// A shared in-memory queue store.
///
/// Clones share the same underlying queues.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `items` to the queue at `key` in pop order, producer-side.
    pub async fn seed<I>(&self, key: &str, items: I)
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        let mut inner = self.inner.lock().await;
        inner.queues.entry(key.to_string()).or_default().extend(items);
    }

    /// Snapshot of the queue at `key`, oldest first.
    pub async fn items(&self, key: &str) -> Vec<Vec<u8>> {
        let inner = self.inner.lock().await;
        inner
            .queues
            .get(key)
            .map(|q| q.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of items currently queued under `key`.
    pub async fn len(&self, key: &str) -> usize {
        let inner = self.inner.lock().await;
        inner.queues.get(key).map_or(0, VecDeque::len)
    }

    /// Makes the next `n` pop calls fail with a command error.
    pub async fn fail_next_pops(&self, n: u32) {
        self.inner.lock().await.fail_pops = n;
    }

    /// Makes the next `n` push calls fail with a command error.
    ///
    /// A failed push applies nothing, so a retried batch is not duplicated.
    pub async fn fail_next_pushes(&self, n: u32) {
        self.inner.lock().await.fail_pushes = n;
    }
}

#[async_trait]
impl QueueStore for MemoryStore {
    async fn pop(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.fail_pops > 0 {
            inner.fail_pops -= 1;
            return Err(StoreError::Command("injected pop failure".to_string()));
        }
        Ok(inner.queues.get_mut(key).and_then(VecDeque::pop_front))
    }

    async fn push(&self, key: &str, items: &[Vec<u8>]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.fail_pushes > 0 {
            inner.fail_pushes -= 1;
            return Err(StoreError::Command("injected push failure".to_string()));
        }
        inner
            .queues
            .entry(key.to_string())
            .or_default()
            .extend(items.iter().cloned());
        Ok(())
    }
}
