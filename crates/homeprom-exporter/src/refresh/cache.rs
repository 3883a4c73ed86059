//! Last-known-value cache for one source.
//!
//! A write swaps in a whole new `Arc<T>` under the write lock and a read clones
//! the `Arc` under the read lock, so readers see either the previous value or
//! the new one, never a mix. There is no expiry: a stale value is served until
//! the next successful write.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

pub struct MetricCache<T> {
    slot: RwLock<Option<Arc<T>>>,
    populated: AtomicBool,
}

impl<T> Default for MetricCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MetricCache<T> {
    /// Empty cache; `read` returns `None` until the first write.
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
            populated: AtomicBool::new(false),
        }
    }

    /// Replace the stored value.
    pub async fn write(&self, value: T) {
        let value = Arc::new(value);
        *self.slot.write().await = Some(value);
        self.populated.store(true, Ordering::Release);
    }

    /// Last written value, if any.
    pub async fn read(&self) -> Option<Arc<T>> {
        self.slot.read().await.clone()
    }
}

/// Type-erased view used by readiness checks.
pub trait CacheStatus: Send + Sync {
    fn is_populated(&self) -> bool;
}

impl<T: Send + Sync> CacheStatus for MetricCache<T> {
    fn is_populated(&self) -> bool {
        self.populated.load(Ordering::Acquire)
    }
}
