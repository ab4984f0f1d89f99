//! Lock Registry
//!
//! Maps physical names to exclusive per-name locks.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex, RwLock};
use tracing::trace;

use crate::naming::PhysicalName;

// =============================================================================
// Per-name Lock
// =============================================================================

#[derive(Debug, Default)]
struct LockState {
    held: bool,
    /// Set once the lock has been removed from the registry
    retired: bool,
}

/// Exclusive lock for one name
///
/// A plain mutex cannot tell its waiters that it has been dropped from the
/// registry, so the held/retired state is tracked explicitly and waiters are
/// parked on a condition variable.
#[derive(Debug)]
struct NameLock {
    state: Mutex<LockState>,
    released: Condvar,
}

impl NameLock {
    /// A lock that is already held by its creator
    fn new_held() -> Self {
        Self {
            state: Mutex::new(LockState {
                held: true,
                retired: false,
            }),
            released: Condvar::new(),
        }
    }

    /// Block until the lock is taken
    ///
    /// Returns `false` if the lock was retired first; the caller must then go
    /// back to the registry.
    fn lock(&self) -> bool {
        let mut state = self.state.lock();
        while state.held && !state.retired {
            self.released.wait(&mut state);
        }
        if state.retired {
            return false;
        }
        state.held = true;
        true
    }

    fn unlock(&self) {
        let mut state = self.state.lock();
        state.held = false;
        drop(state);
        self.released.notify_one();
    }

    /// Release and wake every waiter so they retry against the registry
    fn retire(&self) {
        let mut state = self.state.lock();
        state.retired = true;
        state.held = false;
        drop(state);
        self.released.notify_all();
    }
}

// =============================================================================
// Guard
// =============================================================================

/// Proof that the holder owns a name's lock
///
/// The lock is released when the guard is dropped, on every exit path.
#[must_use = "the name lock is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct NameGuard {
    key: PhysicalName,
    lock: Arc<NameLock>,
}

impl NameGuard {
    fn new(key: PhysicalName, lock: Arc<NameLock>) -> Self {
        Self { key, lock }
    }

    /// The name this guard locks
    pub fn name(&self) -> &PhysicalName {
        &self.key
    }
}

impl Drop for NameGuard {
    fn drop(&mut self) {
        self.lock.unlock();
        trace!(name = %self.key, "released name lock");
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Registry of per-name locks
///
/// ## Concurrency:
/// - `locks`: RwLock over the map, held only for lookup/insert/remove and
///   never while waiting on a name lock or doing I/O
/// - Entries are created on first use and removed by `release_and_forget`
/// - Operations on different names never wait on each other's name locks
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: RwLock<HashMap<PhysicalName, Arc<NameLock>>>,
}

impl LockRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the exclusive lock for `key`, blocking until it is free
    ///
    /// Steps:
    /// 1. Fast path: look the lock up under the shared map lock, then block on
    ///    it with the map lock released
    /// 2. Slow path: take the map lock exclusively, re-check (another thread
    ///    may have inserted meanwhile), insert a new lock already held
    /// 3. If the lock was retired while waiting, start over
    pub fn acquire(&self, key: &PhysicalName) -> NameGuard {
        loop {
            // Step 1: Fast path
            let existing = self.locks.read().get(key).cloned();
            if let Some(lock) = existing {
                if lock.lock() {
                    trace!(name = %key, "acquired existing name lock");
                    return NameGuard::new(key.clone(), lock);
                }
                trace!(name = %key, "name lock retired while waiting, retrying");
                continue;
            }

            // Step 2: Slow path with re-check
            let mut locks = self.locks.write();
            if let Some(lock) = locks.get(key).cloned() {
                drop(locks);
                if lock.lock() {
                    trace!(name = %key, "acquired name lock inserted concurrently");
                    return NameGuard::new(key.clone(), lock);
                }
                continue;
            }

            let lock = Arc::new(NameLock::new_held());
            locks.insert(key.clone(), Arc::clone(&lock));
            trace!(name = %key, "created name lock");
            return NameGuard::new(key.clone(), lock);
        }
    }

    /// Remove the guard's entry from the registry, then release it
    ///
    /// Anyone still waiting on the removed lock is woken and retries through
    /// `acquire`, landing on a fresh entry.
    pub fn release_and_forget(&self, guard: NameGuard) {
        let mut locks = self.locks.write();
        let is_current = locks
            .get(&guard.key)
            .is_some_and(|current| Arc::ptr_eq(current, &guard.lock));
        if is_current {
            locks.remove(&guard.key);
        }
        guard.lock.retire();
        drop(locks);

        trace!(name = %guard.key, "forgot name lock");
    }

    /// Number of names with a live lock entry
    pub fn len(&self) -> usize {
        self.locks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.read().is_empty()
    }

    /// Whether `key` currently has a lock entry
    pub fn contains(&self, key: &PhysicalName) -> bool {
        self.locks.read().contains_key(key)
    }
}
