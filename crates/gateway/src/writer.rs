//! Detached cache writer.
//!
//! Runtime cache population is fire-and-forget: the response path enqueues a
//! write and returns without awaiting it. A single background task performs
//! the writes and owns their error channel, so a failed write is reported
//! there instead of silently vanishing inside an unawaited future. A write
//! that lands after its generation was purged simply disappears with the rest
//! of the old generation.

use tokio::sync::{mpsc, oneshot};
use wheru_core::{CacheDb, CachedResponse};

enum WriteJob {
    Store(CachedResponse),
    Flush(oneshot::Sender<()>),
}

/// Handle for enqueueing detached cache writes.
#[derive(Clone)]
pub struct CacheWriter {
    tx: mpsc::Sender<WriteJob>,
}

impl CacheWriter {
    /// Spawn the writer task over the given database handle.
    pub fn spawn(db: CacheDb) -> Self {
        let (tx, mut rx) = mpsc::channel::<WriteJob>(256);

        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                match job {
                    WriteJob::Store(entry) => {
                        if let Err(e) = db.put_entry(&entry).await {
                            tracing::warn!(url = %entry.url, error = %e, "detached cache write failed");
                        }
                    }
                    WriteJob::Flush(ack) => {
                        let _ = ack.send(());
                    }
                }
            }
        });

        Self { tx }
    }

    /// Enqueue a response for storage without awaiting the write.
    pub async fn enqueue(&self, entry: CachedResponse) {
        if self.tx.send(WriteJob::Store(entry)).await.is_err() {
            tracing::warn!("cache writer stopped, dropping write");
        }
    }

    /// Wait until every previously enqueued write has been applied.
    ///
    /// The writer processes jobs in order, so an acknowledged flush marker
    /// means all earlier stores have completed.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(WriteJob::Flush(ack_tx)).await.is_ok() {
            let _ = ack_rx.await;
        }
    }
}
