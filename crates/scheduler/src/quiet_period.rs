// SPDX-License-Identifier: MIT

//! Admission (§4.1) and cancellation (§4.2): the quiet-period coalescing
//! logic that decides whether a `schedule()` call creates a new waiting
//! item or folds into an existing duplicate.

use std::time::Duration;

use bq_core::{
    should_schedule_anyway, Action, Clock, ItemCore, ItemId, ItemIdAllocator, ItemOutcome, Task,
    WaitingItem,
};

use crate::decision::QueueDecisionHandler;
use crate::item_store::ItemStore;

/// Outcome of an admission attempt: either a fresh waiting item was
/// created, or the submission coalesced into an existing one.
pub enum AdmissionOutcome {
    Admitted(ItemId),
    Coalesced,
    Vetoed,
}

/// §4.1: run admission against `store`. Does not touch maintenance
/// scheduling or persistence — the caller wakes maintenance itself once
/// this returns `Admitted`.
pub fn schedule<T: Task>(
    store: &mut ItemStore<T>,
    alloc: &ItemIdAllocator,
    clock: &impl Clock,
    task: T,
    quiet_period: Duration,
    actions: Vec<Box<dyn Action<T>>>,
    decision_handlers: &[std::sync::Arc<dyn QueueDecisionHandler<T>>],
) -> AdmissionOutcome {
    if decision_handlers
        .iter()
        .any(|h| !h.should_schedule(&task, &actions))
    {
        return AdmissionOutcome::Vetoed;
    }

    let now = clock.now();
    let due = now + quiet_period;
    let duplicate_ids = store.ids_for_task(&task);

    let mut any_duplicate = false;

    for dup_id in duplicate_ids {
        let is_duplicate = match store.find(dup_id) {
            Some(item_ref) => !should_schedule_anyway(&item_ref.core().actions, &actions),
            None => continue,
        };
        if !is_duplicate {
            continue;
        }
        any_duplicate = true;

        if let Some(core) = store.core_mut(dup_id) {
            for action in &actions {
                action.fold_into_existing(&mut core.actions, &task);
            }
        }

        if let Some(mut existing) = store.remove_waiting(dup_id) {
            if quiet_period.is_zero() {
                if due < existing.due_at {
                    existing.due_at = due;
                }
            } else if due > existing.due_at {
                existing.due_at = due;
            }
            store.reinsert_waiting(existing);
        }
    }

    if any_duplicate {
        return AdmissionOutcome::Coalesced;
    }

    let id = alloc.next();
    let (core, _completion) = ItemCore::new(id, task, actions, now);
    store.insert_waiting(WaitingItem { core, due_at: due });
    AdmissionOutcome::Admitted(id)
}

/// §4.2: remove the first occurrence of `task` across waiting, blocked,
/// then buildable (in that order), resolving its future as cancelled.
/// Pending items are never touched here.
pub fn cancel_task<T: Task>(store: &mut ItemStore<T>, task: &T) -> bool {
    for id in store.waiting_ids_for(task) {
        if let Some(mut item) = store.remove_waiting(id) {
            item.core.resolve(ItemOutcome::Cancelled);
            return true;
        }
    }
    for id in store.ids_for_in_blocked(task) {
        if let Some(mut item) = store.remove_blocked(id) {
            item.core.resolve(ItemOutcome::Cancelled);
            return true;
        }
    }
    for id in store.ids_for_in_buildable(task) {
        if let Some(mut item) = store.remove_buildable(id) {
            item.core.resolve(ItemOutcome::Cancelled);
            return true;
        }
    }
    false
}

/// §4.2: remove one specific item by id, regardless of stage, except
/// pending (already dispatched — not cancellable via this path).
pub fn cancel_item<T: Task>(store: &mut ItemStore<T>, id: ItemId) -> bool {
    if let Some(mut item) = store.remove_waiting(id) {
        item.core.resolve(ItemOutcome::Cancelled);
        return true;
    }
    if let Some(mut item) = store.remove_blocked(id) {
        item.core.resolve(ItemOutcome::Cancelled);
        return true;
    }
    if let Some(mut item) = store.remove_buildable(id) {
        item.core.resolve(ItemOutcome::Cancelled);
        return true;
    }
    false
}

#[cfg(test)]
#[path = "quiet_period_tests.rs"]
mod tests;
