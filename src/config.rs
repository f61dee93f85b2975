//! Resolved runtime settings for the mover.
//!
//! `MoverConfig` is built from the CLI flags once at startup and shared
//! read-only by every task. Validation happens before any worker or
//! connection is created; a failed validation terminates the process with
//! a usage diagnostic and exit status 1.

use std::path::PathBuf;
use std::time::Duration;

/// Where flushed batches go.
///
/// A configured destination store always wins over a file path, matching
/// the documented flag priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Push batches into the destination queue store.
    Store(String),
    /// Append items to a local file, one item per line.
    File(PathBuf),
}

/// Complete mover configuration.
#[derive(Debug, Clone)]
pub struct MoverConfig {
    /// Number of source (and destination) shards.
    pub queues: usize,
    /// Workers per shard; the pool size is `queues * threads`.
    pub threads: usize,
    /// Comma-separated source store nodes, e.g. `127.0.0.1:6379,127.0.0.1:6380`.
    pub src_store: String,
    /// Comma-separated destination store nodes. Optional when `dst_file` is set.
    pub dst_store: Option<String>,
    /// Destination file path, used only when no destination store is given.
    pub dst_file: Option<PathBuf>,
    /// Source key prefix.
    pub src_prefix: String,
    /// Destination key prefix. Required only with a destination store.
    pub dst_prefix: String,
    /// When set, `src_prefix` is the whole source key for every worker.
    pub src_only_prefix: bool,
    /// When set, `dst_prefix` is the whole destination key for every worker.
    pub dst_only_prefix: bool,
    /// Per-call time bound on source store operations.
    pub src_timeout: Duration,
    /// Per-call time bound on destination store operations.
    pub dst_timeout: Duration,
    /// Source store password, if authentication is required.
    pub src_password: Option<String>,
    /// Destination store password, if authentication is required.
    pub dst_password: Option<String>,
    /// Milestone log granularity in moved items.
    pub tick: u64,
    /// Interval between throughput samples.
    pub stat_interval: Duration,
    /// Sleep between idle polls and between flush retries.
    pub retry_interval: Duration,
    /// Maximum items drained into one batch.
    pub batch: usize,
    /// Optional process label used to namespace log output.
    pub label: Option<String>,
}

impl Default for MoverConfig {
    fn default() -> Self {
        Self {
            queues: 1,
            threads: 1,
            src_store: String::new(),
            dst_store: None,
            dst_file: None,
            src_prefix: String::new(),
            dst_prefix: String::new(),
            src_only_prefix: false,
            dst_only_prefix: false,
            src_timeout: Duration::from_secs(10),
            dst_timeout: Duration::from_secs(10),
            src_password: None,
            dst_password: None,
            tick: 10_000,
            stat_interval: Duration::from_secs(2),
            retry_interval: Duration::from_millis(100),
            batch: 1,
            label: None,
        }
    }
}

impl MoverConfig {
    /// Total size of the worker pool.
    #[must_use]
    pub const fn worker_count(&self) -> usize {
        self.queues * self.threads
    }

    /// Resolves the effective destination, applying the store-wins rule.
    ///
    /// Call only after [`validate_config`] passed; a config with neither
    /// destination set resolves to an empty store address.
    #[must_use]
    pub fn destination(&self) -> Destination {
        match (&self.dst_store, &self.dst_file) {
            (Some(store), _) => Destination::Store(store.clone()),
            (None, Some(path)) => Destination::File(path.clone()),
            (None, None) => Destination::Store(String::new()),
        }
    }
}

/// Validates the startup requirements.
///
/// Returns a list of diagnostics, one per problem; empty means valid.
#[must_use]
pub fn validate_config(config: &MoverConfig) -> Vec<String> {
    let mut errors = Vec::new();

    if config.src_store.is_empty() {
        errors.push("--src-store is not set".to_string());
    }
    if config.dst_store.is_none() && config.dst_file.is_none() {
        errors.push("neither --dst-store nor --dst-file is set".to_string());
    }
    if config.src_prefix.is_empty() {
        errors.push("--src-prefix is not set".to_string());
    }
    if config.dst_store.is_some() && config.dst_prefix.is_empty() {
        errors.push("--dst-prefix is required when --dst-store is set".to_string());
    }

    errors
}
