use std::sync::Arc;

use clap::Parser;
use tokio::task::JoinSet;
use tracing::Instrument;
use tracing_subscriber::EnvFilter;

use qmv::{
    run_worker, shutdown_signal, validate_config, wait_for_shutdown_signal, Cli, MoverHandle,
    StatReporter,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_config();

    let errors = validate_config(&config);
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("error: {error}");
        }
        eprintln!("run with --help for usage");
        std::process::exit(1);
    }

    let span = match &config.label {
        Some(label) => tracing::info_span!("mover", label = %label),
        None => tracing::info_span!("mover"),
    };

    let (moved, clean) = run(config).instrument(span).await;
    tracing::info!(moved, "all movers finished");
    if !clean {
        std::process::exit(1);
    }
}

/// Runs the worker pool to completion.
///
/// Returns the total items moved and whether every task finished without
/// panicking.
async fn run(config: qmv::MoverConfig) -> (u64, bool) {
    tracing::info!(
        queues = config.queues,
        threads = config.threads,
        workers = config.worker_count(),
        batch = config.batch,
        src_store = %config.src_store,
        src_prefix = %config.src_prefix,
        src_only_prefix = config.src_only_prefix,
        dst = ?config.destination(),
        dst_prefix = %config.dst_prefix,
        dst_only_prefix = config.dst_only_prefix,
        "starting movers"
    );

    let (shutdown_tx, shutdown_rx) = shutdown_signal();
    let handle = MoverHandle::new(shutdown_rx);

    let signal_task = tokio::spawn(wait_for_shutdown_signal(shutdown_tx.clone()));
    let stat_task = tokio::spawn(
        StatReporter::new(handle.clone(), config.stat_interval)
            .run()
            .in_current_span(),
    );

    let config = Arc::new(config);
    let mut workers = JoinSet::new();
    for worker_index in 0..config.worker_count() {
        workers.spawn(
            run_worker(worker_index, Arc::clone(&config), handle.clone()).in_current_span(),
        );
    }

    let mut clean = true;
    while let Some(joined) = workers.join_next().await {
        if let Err(e) = joined {
            tracing::error!(error = %e, "worker task panicked");
            clean = false;
        }
    }

    // All workers are done; release the stat task even if no signal arrived.
    shutdown_tx.send(true).ok();
    if let Err(e) = stat_task.await {
        tracing::error!(error = %e, "stat task failed");
        clean = false;
    }
    signal_task.abort();

    (handle.moved_total(), clean)
}
