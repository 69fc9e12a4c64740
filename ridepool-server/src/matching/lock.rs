//! Named exclusive locks.
//!
//! The registry hands out one async mutex per name, created lazily on first
//! use and kept for the lifetime of the registry. The map itself sits behind
//! a short-lived std mutex that is held only while looking up or inserting
//! an entry, never across an await.
//!
//! These locks are process-local. Several processes sharing one store are
//! not protected from each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::trace;

/// Name of the lock guarding request status changes and ride creation.
pub const MATCHING_LOCK: &str = "matching";

/// Registry of named exclusive locks.
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait up to `timeout` for exclusive access to `name`.
    ///
    /// Returns `None` if the lock is still held when the timeout expires.
    /// The lock is released when the returned guard is dropped, on every
    /// exit path including errors and panics.
    pub async fn acquire(&self, name: &str, timeout: Duration) -> Option<NamedLockGuard> {
        let lock = self.entry(name);
        match tokio::time::timeout(timeout, lock.lock_owned()).await {
            Ok(guard) => {
                trace!(lock = name, "acquired");
                Some(NamedLockGuard {
                    name: name.to_string(),
                    _guard: guard,
                })
            }
            Err(_) => {
                trace!(lock = name, ?timeout, "timed out");
                None
            }
        }
    }

    /// Take `name` only if nobody holds it right now.
    pub fn try_acquire(&self, name: &str) -> Option<NamedLockGuard> {
        let guard = self.entry(name).try_lock_owned().ok()?;
        Some(NamedLockGuard {
            name: name.to_string(),
            _guard: guard,
        })
    }

    /// Number of distinct names seen so far.
    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map().is_empty()
    }

    fn entry(&self, name: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.map();
        if let Some(lock) = locks.get(name) {
            return lock.clone();
        }
        let lock = Arc::new(AsyncMutex::new(()));
        locks.insert(name.to_string(), lock.clone());
        lock
    }

    fn map(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<AsyncMutex<()>>>> {
        // The map only ever holds fully constructed entries, so a poisoned
        // guard still protects a consistent map.
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Exclusive hold on a named lock; released on drop.
#[derive(Debug)]
pub struct NamedLockGuard {
    name: String,
    _guard: OwnedMutexGuard<()>,
}

impl NamedLockGuard {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for NamedLockGuard {
    fn drop(&mut self) {
        trace!(lock = %self.name, "released");
    }
}
