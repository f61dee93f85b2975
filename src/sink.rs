//! Destination sinks.
//!
//! A worker flushes each drained batch to exactly one sink for its whole
//! lifetime: either a queue in the destination store (one multi-item push
//! per batch) or a local file (items appended in drain order, one per
//! line). The file is opened in append mode so restarted movers and
//! concurrent labels extend rather than truncate earlier output.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::store::{QueueStore, StoreError};

/// Errors from flushing a batch.
///
/// Both variants take the same recovery path: the worker keeps the batch,
/// sleeps for the retry interval and flushes it again.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The destination store rejected the push.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Appending to the destination file failed.
    #[error("file append failed: {0}")]
    Io(#[from] std::io::Error),
}

/// One worker's destination.
pub enum Sink {
    /// Push batches onto a destination queue.
    Queue {
        store: Arc<dyn QueueStore>,
        key: String,
    },
    /// Append newline-terminated items to a file.
    File { path: PathBuf, file: File },
}

impl Sink {
    /// Wraps a destination queue.
    #[must_use]
    pub fn queue(store: Arc<dyn QueueStore>, key: String) -> Self {
        Self::Queue { store, key }
    }

    /// Opens `path` for appending, creating it if missing.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the file cannot be opened;
    /// the caller treats this as a fatal worker-startup error.
    pub async fn open_file(path: &Path) -> Result<Self, std::io::Error> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        Ok(Self::File {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Human-readable target for log lines.
    #[must_use]
    pub fn target(&self) -> String {
        match self {
            Self::Queue { key, .. } => key.clone(),
            Self::File { path, .. } => format!("file://{}", path.display()),
        }
    }

    /// Delivers one batch, preserving item order.
    ///
    /// # Errors
    ///
    /// Returns `SinkError` when the push or any append fails. A failed file
    /// flush may have written a prefix of the batch; retrying the same
    /// batch can duplicate those items but never reorders them.
    pub async fn flush(&mut self, batch: &[Vec<u8>]) -> Result<(), SinkError> {
        match self {
            Self::Queue { store, key } => {
                store.push(key, batch).await?;
                Ok(())
            }
            Self::File { file, .. } => {
                for item in batch {
                    file.write_all(item).await?;
                    file.write_all(b"\n").await?;
                }
                file.flush().await?;
                Ok(())
            }
        }
    }
}
