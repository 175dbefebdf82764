// SPDX-License-Identifier: MIT

//! Shared-resource conflict tracking.
//!
//! A minimal stand-in for whatever resource manager the embedding
//! controller uses (the real thing is out of scope per §1). Block
//! evaluation (§4.4) consults it; taking an item buildable → pending
//! reserves its resources, release happens when the caller reports the
//! work unit done.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// Opaque resource identifier (e.g. a workspace path, a license slot).
pub type ResourceId = String;

/// Tracks which resources are currently held, and by which item.
///
/// Cheap to clone (wraps an `Arc<Mutex<..>>`); callers typically keep one
/// instance alive for the scheduler's whole lifetime.
#[derive(Debug, Clone, Default)]
pub struct ResourceController {
    held: Arc<Mutex<HashMap<ResourceId, u64>>>,
}

impl ResourceController {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if any of `wanted` is currently held by a different item.
    pub fn conflicts(&self, wanted: &[ResourceId], holder_item_id: u64) -> bool {
        if wanted.is_empty() {
            return false;
        }
        let held = self.held.lock();
        wanted
            .iter()
            .any(|r| held.get(r).is_some_and(|owner| *owner != holder_item_id))
    }

    /// Reserve `resources` for `item_id`. Idempotent for the same owner.
    pub fn reserve(&self, resources: &[ResourceId], item_id: u64) {
        let mut held = self.held.lock();
        for r in resources {
            held.insert(r.clone(), item_id);
        }
    }

    /// Release any resources held by `item_id`.
    pub fn release_all(&self, item_id: u64) {
        let mut held = self.held.lock();
        held.retain(|_, owner| *owner != item_id);
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
