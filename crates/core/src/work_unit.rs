// SPDX-License-Identifier: MIT

//! Work units: what a [`crate::Action`]less `Mapping` actually assigns to
//! a parked executor (§4.3 Phase C, §4.6).
//!
//! A single buildable item can produce more than one work unit — one
//! "main" unit for the task itself, plus one per subtask (§3:
//! `Task.subTasks()`) dispatched to other executors. An item only moves
//! buildable → pending once at least one *main* unit has been produced.

use crate::id::{ItemId, NodeId, WorkUnitId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A unit of work assigned to exactly one [`crate::node::Node`].
#[derive(Debug, Clone)]
pub struct WorkUnit<T> {
    pub id: WorkUnitId,
    pub item_id: ItemId,
    pub task: T,
    pub node: NodeId,
    /// True for the item's own work; false for a subtask work unit
    /// dispatched alongside it.
    pub is_main: bool,
}

/// Shared handle a `LoadBalancer`'s `Mapping` uses to produce
/// [`WorkUnit`]s for one buildable item, and that the parking protocol
/// (§4.8 step 3) can abort if an executor disappears mid-dispatch.
#[derive(Debug, Clone)]
pub struct WorkUnitContext<T> {
    pub item_id: ItemId,
    pub task: T,
    aborted: Arc<AtomicBool>,
}

impl<T> WorkUnitContext<T> {
    pub fn new(item_id: ItemId, task: T) -> Self {
        Self {
            item_id,
            task,
            aborted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Abort the work this context represents (§4.8 step 3: dispatcher
    /// abort during pop).
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "work_unit_tests.rs"]
mod tests;
