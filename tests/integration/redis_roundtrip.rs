//! Round-trip against a live Redis.
//!
//! Run with `cargo test --features integration` and a server listening on
//! 127.0.0.1:6379. Keys are namespaced per test and deleted afterwards.

use std::sync::Arc;
use std::time::Duration;

use qmv::{MoverHandle, MoverWorker, QueueShard, RedisStore, QueueStore, Sink, StoreConfig, WorkerOptions};

fn store_config() -> StoreConfig {
    StoreConfig {
        nodes: "127.0.0.1:6379".to_string(),
        timeout: Duration::from_secs(2),
        password: None,
    }
}

#[tokio::test]
#[cfg_attr(
    not(feature = "integration"),
    ignore = "requires Redis at 127.0.0.1:6379 (enable feature integration)"
)]
async fn test_redis_list_roundtrip_preserves_fifo() {
    let store = RedisStore::connect(&store_config()).await.unwrap();

    let src_key = "qmv:test:rt:src";
    let dst_key = "qmv:test:rt:dst";

    // Producer order: a is oldest. LPUSH one at a time mirrors a real
    // producer, so RPOP sees a first.
    for item in [b"a", b"b", b"c"] {
        store.push(src_key, &[item.to_vec()]).await.unwrap();
    }

    let (tx, rx) = qmv::shutdown_signal();
    let handle = MoverHandle::new(rx);
    let shard = QueueShard {
        index: 0,
        source_key: src_key.to_string(),
        destination_key: dst_key.to_string(),
    };
    let source = Arc::new(store.clone());
    let sink = Sink::queue(Arc::new(store.clone()), dst_key.to_string());
    let worker = MoverWorker::new(
        shard,
        source,
        sink,
        handle.clone(),
        WorkerOptions {
            batch: 2,
            retry_interval: Duration::from_millis(10),
            tick: 1_000_000,
        },
    );
    let task = tokio::spawn(worker.run());

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while handle.moved_total() < 3 {
        assert!(tokio::time::Instant::now() < deadline, "mover stalled");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    tx.send(true).ok();
    assert_eq!(task.await.unwrap(), 3);

    // Consumer side of the destination list sees the original order.
    let mut drained = Vec::new();
    while let Some(item) = store.pop(dst_key).await.unwrap() {
        drained.push(item);
    }
    assert_eq!(drained, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    assert_eq!(store.pop(src_key).await.unwrap(), None);
}
