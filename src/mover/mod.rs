//! The concurrent mover engine.
//!
//! A fixed pool of `queues * threads` workers drains the source shards,
//! one stat task reports throughput, and one signal task converts
//! SIGINT/SIGTERM into a shared shutdown flag. The only cross-task state
//! is [`MoverHandle`]: a monotonic moved-items counter and the shutdown
//! flag, created before any worker starts and passed into each one.

mod stats;
mod worker;

pub use stats::{StatReporter, StatSample};
pub use worker::{MoverWorker, WorkerOptions};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::sync::watch;

use crate::config::{Destination, MoverConfig};
use crate::shard::QueueShard;
use crate::sink::Sink;
use crate::store::{QueueStore, RedisStore, StoreConfig};

/// Shared state observed by every mover task.
///
/// Clones share the same counter and watch the same shutdown flag.
#[derive(Clone)]
pub struct MoverHandle {
    moved: Arc<AtomicU64>,
    shutdown: watch::Receiver<bool>,
}

impl MoverHandle {
    /// Creates the handle around a shutdown receiver.
    #[must_use]
    pub fn new(shutdown: watch::Receiver<bool>) -> Self {
        Self {
            moved: Arc::new(AtomicU64::new(0)),
            shutdown,
        }
    }

    /// Total items moved across all workers so far.
    #[must_use]
    pub fn moved_total(&self) -> u64 {
        self.moved.load(Ordering::Relaxed)
    }

    /// Records `n` successfully flushed items.
    pub fn add_moved(&self, n: u64) {
        self.moved.fetch_add(n, Ordering::Relaxed);
    }

    /// Whether a stop has been requested.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Sleeps for `duration`, waking early if shutdown is requested.
    ///
    /// A dropped shutdown sender counts as a stop request.
    pub async fn idle(&mut self, duration: Duration) {
        tokio::select! {
            () = tokio::time::sleep(duration) => {}
            _ = self.shutdown.changed() => {}
        }
    }
}

/// Creates the shutdown flag channel.
///
/// The sender flips the flag to `true` exactly once; receivers observe it
/// at every loop boundary.
#[must_use]
pub fn shutdown_signal() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

/// Blocks until SIGINT or SIGTERM, then requests shutdown.
///
/// Spawned once per process; the concrete signal plumbing lives here so the
/// mover loops only ever see the flag.
pub async fn wait_for_shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, stopping movers");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, stopping movers");
        }
    }

    shutdown_tx.send(true).ok();
}

/// Connects one worker's endpoints and runs its mover loop to completion.
///
/// Returns the number of items this worker moved. Endpoint acquisition
/// failures are logged and terminate only this worker; siblings keep
/// running.
pub async fn run_worker(
    worker_index: usize,
    config: Arc<MoverConfig>,
    handle: MoverHandle,
) -> u64 {
    let shard = QueueShard::derive(worker_index, &config);

    let source_config = StoreConfig {
        nodes: config.src_store.clone(),
        timeout: config.src_timeout,
        password: config.src_password.clone(),
    };
    let source: Arc<dyn QueueStore> = match RedisStore::connect(&source_config).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!(
                worker = worker_index,
                src_key = %shard.source_key,
                error = %e,
                "source connect failed, worker exiting"
            );
            return 0;
        }
    };

    let sink = match config.destination() {
        Destination::Store(nodes) => {
            let dst_config = StoreConfig {
                nodes,
                timeout: config.dst_timeout,
                password: config.dst_password.clone(),
            };
            match RedisStore::connect(&dst_config).await {
                Ok(store) => Sink::queue(Arc::new(store), shard.destination_key.clone()),
                Err(e) => {
                    tracing::error!(
                        worker = worker_index,
                        dst_key = %shard.destination_key,
                        error = %e,
                        "destination connect failed, worker exiting"
                    );
                    return 0;
                }
            }
        }
        Destination::File(path) => match Sink::open_file(&path).await {
            Ok(sink) => sink,
            Err(e) => {
                tracing::error!(
                    worker = worker_index,
                    path = %path.display(),
                    error = %e,
                    "destination file open failed, worker exiting"
                );
                return 0;
            }
        },
    };

    MoverWorker::new(shard, source, sink, handle, WorkerOptions::from_config(&config))
        .run()
        .await
}
