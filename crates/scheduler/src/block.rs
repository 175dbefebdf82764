// SPDX-License-Identifier: MIT

//! Block evaluation (§4.4) and the concurrency guard (§4.5). Free
//! functions rather than scheduler methods: both only need read access to
//! a task/item plus the collaborators that influence the decision, which
//! keeps them trivially unit-testable without spinning up a scheduler.

use bq_core::{Item, ResourceController, Task};

use crate::decision::{isolate_dispatcher_call, QueueTaskDispatcher};
use crate::item_store::ItemStore;

/// `isStillBlocked(item)` (§4.4): true iff the task reports itself
/// blocked, its required resources conflict with ones already held, or
/// any dispatcher vetoes it.
pub fn is_still_blocked<T: Task>(
    item: &Item<T>,
    resources: &ResourceController,
    dispatchers: &[std::sync::Arc<dyn QueueTaskDispatcher<T>>],
) -> bool {
    let task = item.task();
    if task.is_build_blocked() {
        return true;
    }
    if resources.conflicts(&task.resource_list(), item.id().get()) {
        return true;
    }
    dispatchers
        .iter()
        .any(|d| isolate_dispatcher_call("can_run", std::panic::AssertUnwindSafe(|| d.can_run(item))).is_some())
}

/// `concurrencyAllows(task)` (§4.5): concurrent-build tasks are always
/// allowed; non-concurrent tasks are allowed only while no buildable or
/// pending item already exists for them (invariant 3).
pub fn concurrency_allows<T: Task>(task: &T, store: &ItemStore<T>) -> bool {
    task.is_concurrent_build() || (!store.has_task_buildable(task) && !store.has_task_pending(task))
}

#[cfg(test)]
#[path = "block_tests.rs"]
mod tests;
