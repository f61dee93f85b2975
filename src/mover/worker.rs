//! The per-worker mover loop.
//!
//! Each worker owns one source store connection and one sink for its whole
//! lifetime and cycles between draining a batch and flushing it:
//!
//! ```text
//! CONNECTING -> DRAINING <-> FLUSHING -> STOPPED
//! ```
//!
//! Items are only removed from the source once they are part of a batch
//! that will be attempted for flush, and a failed flush retries the same
//! unmutated batch, so per-shard order is preserved and delivery is
//! at-least-once.

use std::sync::Arc;
use std::time::Duration;

use crate::config::MoverConfig;
use crate::shard::QueueShard;
use crate::sink::Sink;
use crate::store::QueueStore;

use super::MoverHandle;

/// Loop tuning knobs shared by every worker.
#[derive(Debug, Clone)]
pub struct WorkerOptions {
    /// Maximum items drained into one batch.
    pub batch: usize,
    /// Sleep between idle polls and between flush retries.
    pub retry_interval: Duration,
    /// Per-worker milestone log granularity in moved items.
    pub tick: u64,
}

impl WorkerOptions {
    #[must_use]
    pub fn from_config(config: &MoverConfig) -> Self {
        Self {
            batch: config.batch,
            retry_interval: config.retry_interval,
            tick: config.tick,
        }
    }
}

/// One worker of the mover pool.
pub struct MoverWorker {
    shard: QueueShard,
    source: Arc<dyn QueueStore>,
    sink: Sink,
    target: String,
    handle: MoverHandle,
    options: WorkerOptions,
}

impl MoverWorker {
    #[must_use]
    pub fn new(
        shard: QueueShard,
        source: Arc<dyn QueueStore>,
        sink: Sink,
        handle: MoverHandle,
        options: WorkerOptions,
    ) -> Self {
        let target = sink.target();
        Self {
            shard,
            source,
            sink,
            target,
            handle,
            options,
        }
    }

    /// Runs the drain/flush cycle until shutdown.
    ///
    /// Returns the number of items this worker moved. The worker never
    /// abandons a drained batch: once shutdown is requested it finishes
    /// the current flush attempt before stopping.
    pub async fn run(mut self) -> u64 {
        tracing::info!(
            shard = self.shard.index,
            src_key = %self.shard.source_key,
            dst = %self.target,
            "mover started"
        );

        let mut moved: u64 = 0;
        let mut milestone: u64 = 0;

        while !self.handle.is_shutdown() {
            let batch = self.drain().await;
            if batch.is_empty() {
                // Idle poll backoff.
                self.handle.idle(self.options.retry_interval).await;
                continue;
            }

            if !self.flush(&batch).await {
                break;
            }

            let flushed = batch.len() as u64;
            self.handle.add_moved(flushed);
            moved += flushed;
            if moved - milestone >= self.options.tick {
                milestone = moved;
                tracing::info!(
                    shard = self.shard.index,
                    src_key = %self.shard.source_key,
                    dst = %self.target,
                    moved,
                    "milestone"
                );
            }
        }

        tracing::info!(shard = self.shard.index, moved, "mover stopped");
        moved
    }

    /// Pops items until the batch is full, the source is empty, or
    /// shutdown is observed.
    ///
    /// A failed pop is transient: it is logged and consumes one drain
    /// iteration, bounding how long a sick source can hold the loop.
    async fn drain(&mut self) -> Vec<Vec<u8>> {
        let mut batch = Vec::with_capacity(self.options.batch);
        for _ in 0..self.options.batch {
            if self.handle.is_shutdown() {
                break;
            }
            match self.source.pop(&self.shard.source_key).await {
                Ok(Some(item)) => batch.push(item),
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(
                        shard = self.shard.index,
                        src_key = %self.shard.source_key,
                        error = %e,
                        "pop failed"
                    );
                }
            }
        }
        batch
    }

    /// Delivers `batch`, retrying the same batch at a fixed interval.
    ///
    /// Returns `false` when shutdown was requested before delivery
    /// succeeded; the batch has been attempted at least once by then.
    async fn flush(&mut self, batch: &[Vec<u8>]) -> bool {
        loop {
            match self.sink.flush(batch).await {
                Ok(()) => return true,
                Err(e) => {
                    tracing::error!(
                        shard = self.shard.index,
                        dst = %self.target,
                        len = batch.len(),
                        error = %e,
                        "flush failed"
                    );
                    if self.handle.is_shutdown() {
                        return false;
                    }
                    self.handle.idle(self.options.retry_interval).await;
                    if self.handle.is_shutdown() {
                        return false;
                    }
                }
            }
        }
    }
}
