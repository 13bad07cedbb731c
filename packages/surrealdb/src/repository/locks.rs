use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockTable = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// Keyed async critical sections.
///
/// Clones share the same table, so every repository built from one instance
/// serializes on the same keys. A key's entry lives only while someone holds
/// or waits for it, so the table stays as small as the set of busy keys.
#[derive(Clone, Default)]
pub struct ProjectLocks {
    inner: LockTable,
}

/// Exclusive access to one key. The table entry is evicted on drop once no
/// other task holds or waits for the same key.
pub struct ProjectLockGuard {
    key: String,
    table: LockTable,
    guard: Option<OwnedMutexGuard<()>>,
}

impl ProjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`. Released when the guard drops.
    pub async fn lock(&self, key: &str) -> ProjectLockGuard {
        // Cloned while the shard is locked, so eviction sees this waiter
        let mutex = Arc::clone(self.inner.entry(key.to_string()).or_default().value());
        let guard = mutex.lock_owned().await;
        ProjectLockGuard { key: key.to_string(), table: Arc::clone(&self.inner), guard: Some(guard) }
    }

    /// Number of keys currently held or waited on
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Drop for ProjectLockGuard {
    fn drop(&mut self) {
        // The owned guard keeps its own Arc to the mutex; release it first
        drop(self.guard.take());
        self.table.remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
