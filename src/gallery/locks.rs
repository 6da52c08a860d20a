//! Mutation guards.
//!
//! [`RecordLocks`] serializes mutations that target the same record id.
//! [`InFlight`] admits one holder at a time and rejects the rest instead of
//! queueing them (used for uploads, which have no id yet).

use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::{Error, Result};

/// Per-record async locks.
///
/// An entry is dropped when its last holder releases it with no one else
/// waiting. A waiter cancelled after the holder's release leaves the entry
/// behind; the next lock and release on that id prunes it.
#[derive(Clone, Default)]
pub struct RecordLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl RecordLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other mutation on `id` is running, then hold the lock.
    pub async fn lock(&self, id: &str) -> RecordGuard {
        let mutex = self
            .locks
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = mutex.lock_owned().await;

        RecordGuard {
            id: id.to_string(),
            guard: Some(guard),
            locks: Arc::clone(&self.locks),
        }
    }

    /// Number of ids currently locked or waited on.
    pub fn active(&self) -> usize {
        self.locks.len()
    }
}

/// Held while a mutation on one record runs.
pub struct RecordGuard {
    id: String,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl Drop for RecordGuard {
    fn drop(&mut self) {
        self.guard.take();
        // Only the map still references the mutex: nobody holds or waits on it.
        self.locks
            .remove_if(&self.id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

/// Single in-flight slot.
#[derive(Default)]
pub struct InFlight {
    busy: AtomicBool,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Busy`] naming `what` if the slot is already claimed.
    pub fn try_claim(&self, what: &str) -> Result<InFlightGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::Busy(what.to_string()))?;
        Ok(InFlightGuard { slot: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the slot on drop, including when the owning future is cancelled.
pub struct InFlightGuard<'a> {
    slot: &'a InFlight,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.slot.busy.store(false, Ordering::Release);
    }
}
