//! Command-line interface for the mover binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::MoverConfig;

/// Moves items between sharded FIFO queues, or from queues into a file.
///
/// Keys are formed from a prefix plus a decimal shard index (`jobs:0`,
/// `jobs:1`, ...) unless the corresponding `--*-only-prefix` switch makes
/// the prefix the whole key. The pool runs `queues * threads` workers.
#[derive(Debug, Parser)]
#[command(name = "qmv", version, about)]
pub struct Cli {
    /// Number of queues; source and destination shard counts are equal.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..=2019))]
    pub queues: u64,

    /// Workers per queue; the pool size is threads * queues.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..=20))]
    pub threads: u64,

    /// Source store nodes, e.g. 127.0.0.1:6379,127.0.0.1:6380.
    #[arg(long, default_value = "")]
    pub src_store: String,

    /// Destination store nodes. Takes priority over --dst-file when both are set.
    #[arg(long)]
    pub dst_store: Option<String>,

    /// Destination file path, used when no destination store is given.
    #[arg(long)]
    pub dst_file: Option<PathBuf>,

    /// Key prefix of the source queues, e.g. 'jobs:'.
    #[arg(long, default_value = "")]
    pub src_prefix: String,

    /// Key prefix of the destination queues.
    #[arg(long, default_value = "")]
    pub dst_prefix: String,

    /// Treat --src-prefix as the whole source key (one shared source queue).
    #[arg(long)]
    pub src_only_prefix: bool,

    /// Treat --dst-prefix as the whole destination key.
    #[arg(long)]
    pub dst_only_prefix: bool,

    /// Source store per-call timeout in seconds.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub src_timeout: u64,

    /// Destination store per-call timeout in seconds.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub dst_timeout: u64,

    /// Password for the source store.
    #[arg(long)]
    pub src_password: Option<String>,

    /// Password for the destination store.
    #[arg(long)]
    pub dst_password: Option<String>,

    /// Log a per-worker milestone every this many moved items.
    #[arg(long, default_value_t = 10_000, value_parser = clap::value_parser!(u64).range(1..=10_000_000))]
    pub tick: u64,

    /// Seconds between throughput samples.
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u64).range(1..=86_400))]
    pub stat_interval: u64,

    /// Milliseconds to sleep between idle polls and flush retries.
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(1..=1_000_000))]
    pub retry_interval: u64,

    /// Maximum items moved per flush.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..=100_000))]
    pub batch: u64,

    /// Optional label to distinguish concurrent mover processes in logs.
    #[arg(long)]
    pub label: Option<String>,
}

impl Cli {
    /// Converts parsed flags into the runtime configuration.
    #[must_use]
    pub fn into_config(self) -> MoverConfig {
        MoverConfig {
            queues: self.queues as usize,
            threads: self.threads as usize,
            src_store: self.src_store,
            dst_store: self.dst_store.filter(|s| !s.is_empty()),
            dst_file: self.dst_file,
            src_prefix: self.src_prefix,
            dst_prefix: self.dst_prefix,
            src_only_prefix: self.src_only_prefix,
            dst_only_prefix: self.dst_only_prefix,
            src_timeout: Duration::from_secs(self.src_timeout),
            dst_timeout: Duration::from_secs(self.dst_timeout),
            src_password: self.src_password,
            dst_password: self.dst_password,
            tick: self.tick,
            stat_interval: Duration::from_secs(self.stat_interval),
            retry_interval: Duration::from_millis(self.retry_interval),
            batch: self.batch as usize,
            label: self.label.filter(|l| !l.is_empty()),
        }
    }
}
