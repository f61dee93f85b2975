//! Shared fixtures for the mover scenarios.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use qmv::{MemoryStore, MoverHandle, MoverWorker, QueueShard, Sink, WorkerOptions};

pub const FAST_RETRY: Duration = Duration::from_millis(1);

pub fn options(batch: usize) -> WorkerOptions {
    WorkerOptions {
        batch,
        retry_interval: FAST_RETRY,
        tick: 1_000_000,
    }
}

pub fn shard(index: usize) -> QueueShard {
    QueueShard {
        index,
        source_key: format!("src:{index}"),
        destination_key: format!("dst:{index}"),
    }
}

/// A worker moving one shard between two memory stores.
pub fn queue_worker(
    index: usize,
    source: &MemoryStore,
    destination: &MemoryStore,
    batch: usize,
    handle: MoverHandle,
) -> MoverWorker {
    let shard = shard(index);
    let sink = Sink::queue(
        Arc::new(destination.clone()),
        shard.destination_key.clone(),
    );
    MoverWorker::new(shard, Arc::new(source.clone()), sink, handle, options(batch))
}

pub fn shutdown_pair() -> (watch::Sender<bool>, MoverHandle) {
    let (tx, rx) = qmv::shutdown_signal();
    (tx, MoverHandle::new(rx))
}

/// Seeds `count` distinct items onto one source shard, oldest first.
pub async fn seed_items(store: &MemoryStore, key: &str, count: usize) -> Vec<Vec<u8>> {
    let items: Vec<Vec<u8>> = (0..count)
        .map(|i| format!("item-{i:04}").into_bytes())
        .collect();
    store.seed(key, items.clone()).await;
    items
}

/// Signals shutdown once the source shard is empty, then waits for the
/// worker and returns its moved count.
pub async fn run_until_drained(
    worker: MoverWorker,
    source: MemoryStore,
    source_key: &str,
    tx: watch::Sender<bool>,
) -> u64 {
    let task = tokio::spawn(worker.run());

    let key = source_key.to_string();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while source.len(&key).await > 0 {
        assert!(
            tokio::time::Instant::now() < deadline,
            "source {key} not drained in time"
        );
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    tx.send(true).ok();

    task.await.unwrap()
}
