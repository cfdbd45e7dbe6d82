//! Keyed mutual exclusion.
//!
//! Work on the same key is serialized; work on different keys runs in parallel.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

pub struct KeyedLocks<K> {
    locks: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Get or create the lock for `key`.
    fn get_lock(&self, key: &K) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Run `f` while holding the lock for `key`.
    ///
    /// The guarded value is `()`, so a panic in another holder leaves nothing
    /// inconsistent behind and poisoning is ignored.
    pub fn with_lock<R>(&self, key: &K, f: impl FnOnce() -> R) -> R {
        let lock = self.get_lock(key);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Number of keys with a lock entry.
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop lock entries nobody is holding or waiting on.
    pub fn cleanup(&self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}
