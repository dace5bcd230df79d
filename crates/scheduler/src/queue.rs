//! Bounded queue for fire-and-forget background work.
//!
//! Prefetches and stale-entry refreshes run as detached tokio tasks. The
//! queue caps how many can be outstanding at once, so a filter-change
//! storm cannot grow in-flight requests without limit: when saturated, new
//! work is skipped, not queued. `quiesce` lets tests (and the demo CLI)
//! wait for everything scheduled so far.

use std::future::Future;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

/// Maximum number of outstanding background tasks.
pub const DEFAULT_QUEUE_CAPACITY: usize = 16;

pub struct BackgroundQueue {
    tasks: Mutex<Vec<JoinHandle<()>>>,
    capacity: usize,
}

impl BackgroundQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            capacity,
        }
    }

    /// Spawn `work` if the queue has room. Returns whether it was spawned.
    pub fn try_spawn<F>(&self, work: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks.lock();
        tasks.retain(|handle| !handle.is_finished());
        if tasks.len() >= self.capacity {
            debug!(capacity = self.capacity, "background queue saturated, skipping task");
            return false;
        }
        tasks.push(tokio::spawn(work));
        true
    }

    /// Number of tasks not yet known to be finished.
    pub fn outstanding(&self) -> usize {
        let mut tasks = self.tasks.lock();
        tasks.retain(|handle| !handle.is_finished());
        tasks.len()
    }

    /// Wait until every task scheduled so far has finished, including any
    /// spawned while draining.
    pub async fn quiesce(&self) {
        loop {
            let drained: Vec<JoinHandle<()>> = {
                let mut tasks = self.tasks.lock();
                tasks.drain(..).collect()
            };
            if drained.is_empty() {
                return;
            }
            for handle in drained {
                // A cancelled/panicked background task is already logged
                // at its site; nothing to surface here.
                let _ = handle.await;
            }
        }
    }
}

impl Default for BackgroundQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn quiesce_waits_for_all_tasks() {
        let queue = BackgroundQueue::default();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            let counter = counter.clone();
            assert!(queue.try_spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }

        queue.quiesce().await;
        assert_eq!(counter.load(Ordering::SeqCst), 5);
        assert_eq!(queue.outstanding(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn saturation_skips_new_work() {
        let queue = BackgroundQueue::new(2);

        assert!(queue.try_spawn(tokio::time::sleep(Duration::from_secs(5))));
        assert!(queue.try_spawn(tokio::time::sleep(Duration::from_secs(5))));
        assert!(!queue.try_spawn(async {}));

        queue.quiesce().await;
        assert!(queue.try_spawn(async {}));
    }
}
