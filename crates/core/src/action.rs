// SPDX-License-Identifier: MIT

//! The `Action` capability trait.
//!
//! An action is opaque per-request metadata attached to an item. Rather
//! than modeling the source's three marker interfaces (`QueueAction`,
//! `FoldableAction`, `LabelAssignmentAction`) as separate types queried
//! via a downcast, each sub-capability is a method on one object-safe
//! trait with a no-op default — a concrete action opts in simply by
//! overriding the method it cares about.

use crate::task::Label;
use std::fmt::Debug;

/// Per-request metadata attached to a queue item.
pub trait Action<T>: Debug + Send + Sync {
    /// `QueueAction` capability: vetoes duplicate coalescing.
    ///
    /// Returning `Some(true)` means "schedule a new item anyway, don't
    /// coalesce with the existing one matching this task". `None` means
    /// this action has no opinion (the common case — most actions are
    /// plain metadata).
    fn should_schedule(&self, _other_actions: &[Box<dyn Action<T>>]) -> Option<bool> {
        None
    }

    /// `FoldableAction` capability: side-effects merged into an existing
    /// queued item when this action's submission turned out to be a
    /// duplicate. `existing_actions` is the duplicate item's action list,
    /// mutable so the fold can append/replace entries.
    fn fold_into_existing(&self, _existing_actions: &mut Vec<Box<dyn Action<T>>>, _task: &T) {}

    /// `LabelAssignmentAction` capability: overrides the task's default
    /// label (§3). `None` means this action doesn't assign a label.
    fn assigned_label(&self, _task: &T) -> Option<Label> {
        None
    }
}

/// Fold `new_actions` into `existing_actions` for a duplicate submission
/// (§4.1 step 6), then compute whether any `QueueAction` on either side
/// vetoes coalescing (§4.1 step 4).
pub fn should_schedule_anyway<T>(
    existing_actions: &[Box<dyn Action<T>>],
    new_actions: &[Box<dyn Action<T>>],
) -> bool {
    existing_actions
        .iter()
        .any(|a| a.should_schedule(new_actions) == Some(true))
        || new_actions
            .iter()
            .any(|a| a.should_schedule(existing_actions) == Some(true))
}

/// Resolve the effective label for a task: the first action in the list
/// to return `Some`, falling back to the task's own default (decided in
/// DESIGN.md — the source is silent on tie-breaking order).
pub fn resolve_label<T>(task: &T, actions: &[Box<dyn Action<T>>], default: Option<Label>) -> Option<Label> {
    actions
        .iter()
        .find_map(|a| a.assigned_label(task))
        .or(default)
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
