// SPDX-License-Identifier: MIT

//! The item lifecycle model (§3, §9).
//!
//! `Item<T>` is a tagged enum over the four stages; each variant shares an
//! [`ItemCore`] payload plus its own stage-specific field. Stage
//! transitions replace the enum value rather than mutating a type tag in
//! place, per the design note in §9.

use crate::action::Action;
use crate::id::{ItemId, WorkUnitId};
use crate::task::Task;
use std::time::Instant;
use tokio::sync::oneshot;

/// How an item's completion future resolves.
#[derive(Debug, Clone)]
pub enum ItemOutcome {
    /// The item was cancelled before a work unit was ever assigned.
    Cancelled,
    /// The item was assigned this work unit and handed to an executor.
    Started(WorkUnitId),
}

/// Handed back to the caller of `schedule()`; resolves per [`ItemOutcome`].
pub type CompletionReceiver = oneshot::Receiver<ItemOutcome>;

/// Fields shared by every stage (§3: `{ id, task, actions, future,
/// inQueueSince }`).
#[derive(Debug)]
pub struct ItemCore<T> {
    pub id: ItemId,
    pub task: T,
    pub actions: Vec<Box<dyn Action<T>>>,
    /// Set once at admission, never touched again (invariant 6).
    pub in_queue_since: Instant,
    completion: Option<oneshot::Sender<ItemOutcome>>,
}

impl<T: Task> ItemCore<T> {
    /// Create a new core and the [`CompletionReceiver`] the caller should
    /// be handed back.
    pub fn new(
        id: ItemId,
        task: T,
        actions: Vec<Box<dyn Action<T>>>,
        in_queue_since: Instant,
    ) -> (Self, CompletionReceiver) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                id,
                task,
                actions,
                in_queue_since,
                completion: Some(tx),
            },
            rx,
        )
    }

    /// Resolve the completion future, if it hasn't already been resolved.
    /// Invariant 7: callers must do this before the item leaves every
    /// collection it's tracked in.
    pub fn resolve(&mut self, outcome: ItemOutcome) {
        if let Some(tx) = self.completion.take() {
            let _ = tx.send(outcome);
        }
    }
}

/// An item waiting out its quiet period.
#[derive(Debug)]
pub struct WaitingItem<T> {
    pub core: ItemCore<T>,
    pub due_at: Instant,
}

/// An item with an outstanding block (resource conflict, dispatcher veto,
/// or the task's own `is_build_blocked`).
#[derive(Debug)]
pub struct BlockedItem<T> {
    pub core: ItemCore<T>,
    pub entered_non_waiting_at: Instant,
}

/// An item with no outstanding blocks, awaiting an executor.
#[derive(Debug)]
pub struct BuildableItem<T> {
    pub core: ItemCore<T>,
    pub entered_non_waiting_at: Instant,
}

/// An item handed to an executor but not yet started.
#[derive(Debug)]
pub struct PendingItem<T> {
    pub core: ItemCore<T>,
    pub entered_non_waiting_at: Instant,
}

/// Tagged union over the four lifecycle stages (§9 design note).
#[derive(Debug)]
pub enum Item<T: Task> {
    Waiting(WaitingItem<T>),
    Blocked(BlockedItem<T>),
    Buildable(BuildableItem<T>),
    Pending(PendingItem<T>),
}

impl<T: Task> Item<T> {
    pub fn id(&self) -> ItemId {
        self.core().id
    }

    pub fn task(&self) -> &T {
        &self.core().task
    }

    pub fn in_queue_since(&self) -> Instant {
        self.core().in_queue_since
    }

    pub fn core(&self) -> &ItemCore<T> {
        match self {
            Item::Waiting(i) => &i.core,
            Item::Blocked(i) => &i.core,
            Item::Buildable(i) => &i.core,
            Item::Pending(i) => &i.core,
        }
    }

    pub fn core_mut(&mut self) -> &mut ItemCore<T> {
        match self {
            Item::Waiting(i) => &mut i.core,
            Item::Blocked(i) => &mut i.core,
            Item::Buildable(i) => &mut i.core,
            Item::Pending(i) => &mut i.core,
        }
    }

    pub fn stage_name(&self) -> &'static str {
        match self {
            Item::Waiting(_) => "waiting",
            Item::Blocked(_) => "blocked",
            Item::Buildable(_) => "buildable",
            Item::Pending(_) => "pending",
        }
    }
}

/// Build a [`BlockedItem`] from a [`WaitingItem`] leaving the waiting
/// stage (§4.3 Phase B), stamping `entered_non_waiting_at`.
impl<T> WaitingItem<T> {
    pub fn into_blocked(self, now: Instant) -> BlockedItem<T> {
        BlockedItem {
            core: self.core,
            entered_non_waiting_at: now,
        }
    }

    pub fn into_buildable(self, now: Instant) -> BuildableItem<T> {
        BuildableItem {
            core: self.core,
            entered_non_waiting_at: now,
        }
    }
}

impl<T> BlockedItem<T> {
    pub fn into_buildable(self) -> BuildableItem<T> {
        BuildableItem {
            core: self.core,
            entered_non_waiting_at: self.entered_non_waiting_at,
        }
    }
}

impl<T> BuildableItem<T> {
    pub fn into_blocked(self) -> BlockedItem<T> {
        BlockedItem {
            core: self.core,
            entered_non_waiting_at: self.entered_non_waiting_at,
        }
    }

    pub fn into_pending(self) -> PendingItem<T> {
        PendingItem {
            core: self.core,
            entered_non_waiting_at: self.entered_non_waiting_at,
        }
    }
}

#[cfg(test)]
#[path = "item_tests.rs"]
mod tests;
