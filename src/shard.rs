//! Shard routing: mapping a worker index to concrete queue keys.
//!
//! Keys are derived from a prefix plus the decimal shard index, e.g. a
//! prefix of `jobs:` with 3 queues yields `jobs:0`, `jobs:1`, `jobs:2`.
//! When the "only prefix" switch is set the prefix itself is the key and
//! every worker mapped to that side shares one physical queue.

use crate::config::MoverConfig;

/// A worker's resolved source/destination key pair.
///
/// Computed once at worker startup and never mutated. The mapping is
/// deterministic: the same configuration and worker index always produce
/// the same keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueShard {
    /// Shard index in `0..queues`.
    pub index: usize,
    /// Key the worker pops from.
    pub source_key: String,
    /// Key the worker pushes to (unused when the sink is a file).
    pub destination_key: String,
}

impl QueueShard {
    /// Derives the shard for worker `worker_index`.
    ///
    /// Worker indices beyond the queue count wrap around, so
    /// `queues * threads` workers cover each shard `threads` times.
    #[must_use]
    pub fn derive(worker_index: usize, config: &MoverConfig) -> Self {
        let index = worker_index % config.queues;
        Self {
            index,
            source_key: shard_key(&config.src_prefix, config.src_only_prefix, index),
            destination_key: shard_key(&config.dst_prefix, config.dst_only_prefix, index),
        }
    }
}

/// Builds the key for one side of a shard.
///
/// Pure and infallible: either the prefix verbatim, or the prefix followed
/// by the decimal shard index.
#[must_use]
pub fn shard_key(prefix: &str, only_prefix: bool, index: usize) -> String {
    if only_prefix {
        prefix.to_string()
    } else {
        format!("{prefix}{index}")
    }
}
