// SPDX-License-Identifier: MIT

//! Bounded-staleness snapshot cache for `approximate_items()` (§4.10).
//!
//! A miss rebuilds the cached copy and bumps the expiry by the staleness
//! window; concurrent callers during a miss may observe the stale value
//! — accepted per the design note.

use std::time::{Duration, Instant};

use bq_core::{ItemId, Task};
use parking_lot::Mutex;

/// One cached read of the item set, tagged with its expiry instant.
struct Snapshot<T> {
    items: Vec<(ItemId, T, &'static str)>,
    expires_at: Instant,
}

/// Caches a copy of the queue's items, refreshed at most once per
/// staleness window.
pub struct SnapshotCache<T: Task> {
    staleness_window: Duration,
    cached: Mutex<Option<Snapshot<T>>>,
}

impl<T: Task> SnapshotCache<T> {
    pub fn new(staleness_window: Duration) -> Self {
        Self {
            staleness_window,
            cached: Mutex::new(None),
        }
    }

    /// Return the cached snapshot if still fresh at `now`; otherwise
    /// rebuild it with `build` and cache the result.
    pub fn get_or_build(
        &self,
        now: Instant,
        build: impl FnOnce() -> Vec<(ItemId, T, &'static str)>,
    ) -> Vec<(ItemId, T, &'static str)> {
        let mut guard = self.cached.lock();
        if let Some(snapshot) = guard.as_ref() {
            if snapshot.expires_at > now {
                return snapshot.items.clone();
            }
        }
        let items = build();
        *guard = Some(Snapshot {
            items: items.clone(),
            expires_at: now + self.staleness_window,
        });
        items
    }
}

#[cfg(test)]
#[path = "snapshot_cache_tests.rs"]
mod tests;
