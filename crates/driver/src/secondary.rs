//! Secondary worker pool for asynchronous follow-up transactions.
//!
//! Some heavy transactions trigger a dependent transaction that completes
//! asynchronously (the market-feed / trade-result pattern). Those follow-ups
//! run here, on a small bounded pool, so they neither occupy primary workers
//! nor run unbounded. Every submission is recorded through the standard
//! execution wrapper against a caller-supplied aggregator, which is shared
//! by reference with the mix's placeholder entry so the final report
//! reflects true async completion counts.

use crate::executor::execute_recorded;
use crate::transaction::BenchTransaction;
use oltpmix_core::TxStats;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

/// Pool size for a dependent transaction: `max(2, ceil(clients × mix_share ×
/// damping))`.
pub fn pool_size_for(clients: usize, mix_share: f64, damping: f64) -> usize {
    let sized = (clients as f64 * mix_share * damping).ceil() as usize;
    sized.max(2)
}

/// Bounded pool absorbing asynchronous follow-up work.
pub struct SecondaryPool {
    size: usize,
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
    cancel: CancellationToken,
}

impl SecondaryPool {
    /// Create a pool running at most `size` follow-ups concurrently.
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            size,
            permits: Arc::new(Semaphore::new(size)),
            tracker: TaskTracker::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Create a pool sized for a dependent transaction's mix share.
    pub fn sized_for(clients: usize, mix_share: f64, damping: f64) -> Self {
        Self::new(pool_size_for(clients, mix_share, damping))
    }

    /// Maximum concurrent follow-ups.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Submit one follow-up execution.
    ///
    /// The execution queues until a pool slot frees up, then runs through
    /// the standard wrapper against `stats` — the same aggregator instance
    /// the mix's placeholder entry was registered with.
    pub fn submit(&self, tx: Arc<dyn BenchTransaction>, stats: Arc<TxStats>) {
        let permits = Arc::clone(&self.permits);
        let cancel = self.cancel.clone();
        self.tracker.spawn(async move {
            let work = async {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };
                execute_recorded(tx.as_ref(), &stats).await;
            };
            // Dropped mid-flight if the pool is force-cancelled.
            cancel.run_until_cancelled(work).await;
        });
    }

    /// Number of submissions not yet finished.
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Wait until every submitted follow-up has finished, without closing
    /// the pool, giving up after `grace`.
    ///
    /// Used as a barrier between the warmup and measurement phases: a
    /// follow-up submitted during warmup must not land in an aggregator
    /// that has already been cleared for measurement.
    pub async fn drain(&self, grace: Duration) {
        let deadline = tokio::time::Instant::now() + grace;
        while self.tracker.len() > 0 {
            if tokio::time::Instant::now() >= deadline {
                warn!(
                    pending = self.tracker.len(),
                    grace_ms = grace.as_millis() as u64,
                    "secondary pool still busy after drain grace"
                );
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    /// Shut the pool down: wait up to `grace` for in-flight follow-ups,
    /// then force-cancel whatever remains. Never hangs on stuck work.
    pub async fn shutdown(&self, grace: Duration) {
        self.tracker.close();
        if tokio::time::timeout(grace, self.tracker.wait()).await.is_err() {
            warn!(
                pending = self.tracker.len(),
                grace_ms = grace.as_millis() as u64,
                "secondary pool did not drain in time, force-cancelling"
            );
            self.cancel.cancel();
            self.tracker.wait().await;
        }
        debug!("secondary pool drained");
    }
}
