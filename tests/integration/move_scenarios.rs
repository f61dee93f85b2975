//! Mover behavior against in-memory stores and files.

use std::sync::Arc;
use std::time::Duration;

use qmv::{MemoryStore, MoverWorker, QueueShard, Sink, StatReporter};

use crate::common;

#[tokio::test]
async fn test_moves_queue_to_queue_preserving_order() {
    let source = MemoryStore::new();
    let destination = MemoryStore::new();
    let items = common::seed_items(&source, "src:0", 50).await;

    let (tx, handle) = common::shutdown_pair();
    let worker = common::queue_worker(0, &source, &destination, 7, handle.clone());
    let moved = common::run_until_drained(worker, source.clone(), "src:0", tx).await;

    assert_eq!(moved, 50);
    assert_eq!(handle.moved_total(), 50);
    assert_eq!(destination.items("dst:0").await, items);
    assert_eq!(source.len("src:0").await, 0);
}

#[tokio::test]
async fn test_moves_queue_to_file_in_drain_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drained.dat");

    let source = MemoryStore::new();
    source
        .seed("src:0", [b"a".to_vec(), b"b".to_vec(), b"c".to_vec()])
        .await;

    let (tx, handle) = common::shutdown_pair();
    let sink = Sink::open_file(&path).await.unwrap();
    let worker = MoverWorker::new(
        common::shard(0),
        Arc::new(source.clone()),
        sink,
        handle.clone(),
        common::options(2),
    );
    let moved = common::run_until_drained(worker, source, "src:0", tx).await;

    assert_eq!(moved, 3);
    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content, "a\nb\nc\n");
}

#[tokio::test]
async fn test_push_failure_retries_without_losing_items() {
    let source = MemoryStore::new();
    let destination = MemoryStore::new();
    let items = common::seed_items(&source, "src:0", 10).await;
    destination.fail_next_pushes(3).await;

    let (tx, handle) = common::shutdown_pair();
    let worker = common::queue_worker(0, &source, &destination, 4, handle);
    let moved = common::run_until_drained(worker, source, "src:0", tx).await;

    // The failed pushes applied nothing, so delivery is exactly the seeded
    // items in order; with a partially-applied sink this would be
    // at-least-once instead.
    assert_eq!(moved, 10);
    assert_eq!(destination.items("dst:0").await, items);
}

#[tokio::test]
async fn test_pop_failures_do_not_drop_items() {
    let source = MemoryStore::new();
    let destination = MemoryStore::new();
    let items = common::seed_items(&source, "src:0", 5).await;
    source.fail_next_pops(2).await;

    let (tx, handle) = common::shutdown_pair();
    let worker = common::queue_worker(0, &source, &destination, 3, handle);
    let moved = common::run_until_drained(worker, source, "src:0", tx).await;

    assert_eq!(moved, 5);
    assert_eq!(destination.items("dst:0").await, items);
}

#[tokio::test]
async fn test_counter_sums_across_shards() {
    let source = MemoryStore::new();
    let destination = MemoryStore::new();
    common::seed_items(&source, "src:0", 20).await;
    common::seed_items(&source, "src:1", 30).await;

    let (tx, handle) = common::shutdown_pair();
    let worker0 = common::queue_worker(0, &source, &destination, 8, handle.clone());
    let worker1 = common::queue_worker(1, &source, &destination, 8, handle.clone());
    let task0 = tokio::spawn(worker0.run());
    let task1 = tokio::spawn(worker1.run());

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while handle.moved_total() < 50 {
        assert!(tokio::time::Instant::now() < deadline, "movers stalled");
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    tx.send(true).ok();

    let moved = task0.await.unwrap() + task1.await.unwrap();
    assert_eq!(moved, 50);
    assert_eq!(handle.moved_total(), 50);
    assert_eq!(destination.len("dst:0").await, 20);
    assert_eq!(destination.len("dst:1").await, 30);
}

#[tokio::test]
async fn test_shared_source_fans_out_to_sharded_destinations() {
    // src-only-prefix layout: every worker drains the same source key but
    // keeps its own destination shard.
    let source = MemoryStore::new();
    let destination = MemoryStore::new();
    common::seed_items(&source, "inbox", 40).await;

    let (tx, handle) = common::shutdown_pair();
    let mut tasks = Vec::new();
    for index in 0..2 {
        let shard = QueueShard {
            index,
            source_key: "inbox".to_string(),
            destination_key: format!("dst:{index}"),
        };
        let sink = Sink::queue(Arc::new(destination.clone()), shard.destination_key.clone());
        let worker = MoverWorker::new(
            shard,
            Arc::new(source.clone()),
            sink,
            handle.clone(),
            common::options(5),
        );
        tasks.push(tokio::spawn(worker.run()));
    }

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while handle.moved_total() < 40 {
        assert!(tokio::time::Instant::now() < deadline, "movers stalled");
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    tx.send(true).ok();

    let moved: u64 = join_moved(tasks).await;
    assert_eq!(moved, 40);
    assert_eq!(
        destination.len("dst:0").await + destination.len("dst:1").await,
        40
    );
    assert_eq!(source.len("inbox").await, 0);
}

async fn join_moved(tasks: Vec<tokio::task::JoinHandle<u64>>) -> u64 {
    let mut total = 0;
    for task in tasks {
        total += task.await.unwrap();
    }
    total
}

#[tokio::test]
async fn test_stat_reporter_tracks_worker_progress() {
    let source = MemoryStore::new();
    let destination = MemoryStore::new();
    common::seed_items(&source, "src:0", 25).await;

    let (tx, handle) = common::shutdown_pair();
    let stat_task = tokio::spawn(
        StatReporter::new(handle.clone(), Duration::from_millis(5)).run(),
    );

    let worker = common::queue_worker(0, &source, &destination, 5, handle.clone());
    let moved = common::run_until_drained(worker, source, "src:0", tx).await;

    assert_eq!(moved, 25);
    // The reporter observes the same shutdown flag and must exit too.
    tokio::time::timeout(Duration::from_secs(5), stat_task)
        .await
        .expect("stat reporter did not stop")
        .unwrap();
}
