use crate::operations::{ExpireChunksOperation, ExpireChunksOperationRequest};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub type TimerId = u64;

/// Shortest period a sweep task will tick at.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Runs periodic sweeps of abandoned chunks.
///
/// Each sweep is an idempotent removal, so a task can be aborted at any
/// point and started again later.
pub struct ExpiryScheduler {
    operation: ExpireChunksOperation,
    next_id: AtomicU64,
    tasks: Mutex<HashMap<TimerId, JoinHandle<()>>>,
}

impl ExpiryScheduler {
    pub fn new(operation: ExpireChunksOperation) -> Self {
        Self {
            operation,
            next_id: AtomicU64::new(1),
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Spawn a sweep every `interval` removing chunks older than `ttl`.
    /// Intervals below [`MIN_SWEEP_INTERVAL`] are raised to it. Must be called
    /// from within a tokio runtime.
    pub fn start(&self, interval: Duration, ttl: Duration) -> TimerId {
        let interval = interval.max(MIN_SWEEP_INTERVAL);
        let timer_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let operation = self.operation.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if let Err(e) = operation.run(ExpireChunksOperationRequest { ttl }).await {
                    tracing::warn!("Chunk expiry sweep {} failed: {}", timer_id, e);
                }
            }
        });

        self.lock_tasks().insert(timer_id, handle);
        tracing::info!(
            "Started chunk expiry {} (interval {:?}, ttl {:?})",
            timer_id,
            interval,
            ttl
        );
        timer_id
    }

    /// Abort a running sweep. Returns false for unknown ids.
    pub fn cancel(&self, timer_id: TimerId) -> bool {
        match self.lock_tasks().remove(&timer_id) {
            Some(handle) => {
                handle.abort();
                tracing::info!("Stopped chunk expiry {}", timer_id);
                true
            }
            None => false,
        }
    }

    pub fn active(&self) -> Vec<TimerId> {
        let mut ids: Vec<TimerId> = self
            .lock_tasks()
            .iter()
            .filter(|(_, handle)| !handle.is_finished())
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    fn lock_tasks(&self) -> std::sync::MutexGuard<'_, HashMap<TimerId, JoinHandle<()>>> {
        // a poisoned map still holds valid handles
        self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for ExpiryScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.lock_tasks().drain() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CallerId, CapacityMonitor, ChunkStore};
    use bytes::Bytes;
    use std::sync::Arc;

    #[tokio::test]
    async fn sweeps_until_cancelled() {
        let temp_dir = tempfile::tempdir().unwrap();
        let capacity = Arc::new(CapacityMonitor::new(1_000, 0));
        let store = Arc::new(
            ChunkStore::new(temp_dir.path().join("staging"), 1_000, capacity.clone()).unwrap(),
        );
        let scheduler = ExpiryScheduler::new(ExpireChunksOperation::new(store.clone()));
        let alice = CallerId::new("alice").unwrap();

        store.put_chunk(&alice, Bytes::from("stale"), 0).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let first = scheduler.start(Duration::from_millis(10), Duration::ZERO);
        assert_eq!(first, 1);
        assert_eq!(scheduler.active(), vec![1]);

        for _ in 0..100 {
            if store.is_empty().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(store.is_empty().await);
        assert_eq!(capacity.used(), 0);

        assert!(scheduler.cancel(first));
        assert!(!scheduler.cancel(first));
        assert!(scheduler.active().is_empty());

        let second = scheduler.start(Duration::from_secs(60), Duration::from_secs(600));
        assert_eq!(second, 2);
    }

    #[tokio::test]
    async fn zero_interval_still_sweeps() {
        let temp_dir = tempfile::tempdir().unwrap();
        let capacity = Arc::new(CapacityMonitor::new(1_000, 0));
        let store = Arc::new(
            ChunkStore::new(temp_dir.path().join("staging"), 1_000, capacity.clone()).unwrap(),
        );
        let scheduler = ExpiryScheduler::new(ExpireChunksOperation::new(store.clone()));
        let alice = CallerId::new("alice").unwrap();

        let timer = scheduler.start(Duration::ZERO, Duration::ZERO);
        store.put_chunk(&alice, Bytes::from("short lived"), 0).await.unwrap();

        for _ in 0..100 {
            if store.is_empty().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(store.is_empty().await);
        assert_eq!(scheduler.active(), vec![timer]);
        assert!(scheduler.cancel(timer));
    }
}
