use crate::error::{FileStoreError, Result};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Tracks bytes held by the staging area and the asset catalog against a
/// single global threshold.
#[derive(Debug)]
pub struct CapacityMonitor {
    threshold: u64,
    used: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacitySnapshot {
    pub used_bytes: u64,
    pub threshold_bytes: u64,
    pub is_full: bool,
}

impl CapacityMonitor {
    pub fn new(threshold: u64, initial_used: u64) -> Self {
        Self {
            threshold,
            used: AtomicU64::new(initial_used),
        }
    }

    pub fn is_full(&self) -> bool {
        self.used.load(Ordering::Acquire) >= self.threshold
    }

    /// Admit `bytes` of new chunk data unless the store is already full.
    ///
    /// The fullness check and the increment happen in one atomic update,
    /// so concurrent uploads cannot all pass a check made against the same
    /// stale value.
    pub fn try_admit(&self, bytes: u64) -> Result<()> {
        let threshold = self.threshold;
        self.used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                if used >= threshold {
                    None
                } else {
                    Some(used.saturating_add(bytes))
                }
            })
            .map(|_| ())
            .map_err(|used| FileStoreError::CapacityExceeded { used, threshold })
    }

    /// Account for bytes that are already stored (e.g. a committed asset).
    pub fn record(&self, bytes: u64) {
        self.used.fetch_add(bytes, Ordering::AcqRel);
    }

    pub fn release(&self, bytes: u64) {
        // never underflows: fetch_update retries until the closure's value sticks
        let _ = self
            .used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                Some(used.saturating_sub(bytes))
            });
    }

    pub fn used(&self) -> u64 {
        self.used.load(Ordering::Acquire)
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    pub fn snapshot(&self) -> CapacitySnapshot {
        let used_bytes = self.used();
        CapacitySnapshot {
            used_bytes,
            threshold_bytes: self.threshold,
            is_full: used_bytes >= self.threshold,
        }
    }
}
