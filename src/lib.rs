//! qmv moves items between sharded FIFO queues.
//!
//! Sources are Redis lists named by a prefix plus a decimal shard index;
//! the destination is either another set of sharded lists or a local
//! append-only file. A fixed pool of workers drains each shard in batches,
//! preserving per-shard order and delivering every item at least once.
//!
//! The binary in `main.rs` wires the pieces together; the library exposes
//! them so the test suite can run movers against in-memory stores.

pub mod cli;
pub mod config;
pub mod mover;
pub mod shard;
pub mod sink;
pub mod store;

pub use cli::Cli;
pub use config::{validate_config, Destination, MoverConfig};
pub use mover::{
    run_worker, shutdown_signal, wait_for_shutdown_signal, MoverHandle, MoverWorker, StatReporter,
    StatSample, WorkerOptions,
};
pub use shard::{shard_key, QueueShard};
pub use sink::{Sink, SinkError};
pub use store::{MemoryStore, QueueStore, RedisStore, StoreConfig, StoreError};
