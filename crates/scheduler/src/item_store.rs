// SPDX-License-Identifier: MIT

//! The four stage containers (§2, §3) plus the id allocator. Pure data
//! structure: no scheduling policy lives here, just storage and the
//! invariants around ordering and uniqueness (invariants 1-2).

use std::time::Instant;

use bq_core::{
    BlockedItem, BuildableItem, ItemId, ItemIdAllocator, PendingItem, Task, WaitingItem,
};
use indexmap::IndexMap;

/// Waiting items ordered by `(due_at, id)` ascending (invariant 2).
/// `Instant` and `ItemId` are both `Ord`, so a `BTreeMap` keyed on the
/// pair gives the ordering for free.
type WaitingKey = (Instant, ItemId);

#[derive(Default)]
pub struct ItemStore<T: Task> {
    waiting: std::collections::BTreeMap<WaitingKey, WaitingItem<T>>,
    blocked: IndexMap<ItemId, BlockedItem<T>>,
    buildable: IndexMap<ItemId, BuildableItem<T>>,
    pending: IndexMap<ItemId, PendingItem<T>>,
    alloc: ItemIdAllocator,
}

impl<T: Task> ItemStore<T> {
    pub fn new(alloc: ItemIdAllocator) -> Self {
        Self {
            waiting: Default::default(),
            blocked: IndexMap::new(),
            buildable: IndexMap::new(),
            pending: IndexMap::new(),
            alloc,
        }
    }

    pub fn alloc(&self) -> &ItemIdAllocator {
        &self.alloc
    }

    // --- waiting ---------------------------------------------------

    pub fn insert_waiting(&mut self, item: WaitingItem<T>) {
        self.waiting.insert((item.due_at, item.core.id), item);
    }

    /// The smallest `(due_at, id)` waiting item, without removing it.
    pub fn peek_waiting(&self) -> Option<&WaitingItem<T>> {
        self.waiting.values().next()
    }

    /// Remove and return the smallest waiting item.
    pub fn pop_waiting(&mut self) -> Option<WaitingItem<T>> {
        let key = *self.waiting.keys().next()?;
        self.waiting.remove(&key)
    }

    pub fn waiting_ids_for(&self, task: &T) -> Vec<ItemId> {
        self.waiting
            .values()
            .filter(|i| &i.core.task == task)
            .map(|i| i.core.id)
            .collect()
    }

    pub fn remove_waiting(&mut self, id: ItemId) -> Option<WaitingItem<T>> {
        let key = self
            .waiting
            .iter()
            .find(|(_, i)| i.core.id == id)
            .map(|(k, _)| *k)?;
        self.waiting.remove(&key)
    }

    /// Re-key a waiting item after its `due_at` changed (§4.1 step 6).
    pub fn reinsert_waiting(&mut self, item: WaitingItem<T>) {
        self.insert_waiting(item);
    }

    pub fn waiting_len(&self) -> usize {
        self.waiting.len()
    }

    pub fn waiting_ids(&self) -> Vec<ItemId> {
        self.waiting.values().map(|i| i.core.id).collect()
    }

    // --- blocked -----------------------------------------------------

    pub fn insert_blocked(&mut self, item: BlockedItem<T>) {
        self.blocked.insert(item.core.id, item);
    }

    pub fn remove_blocked(&mut self, id: ItemId) -> Option<BlockedItem<T>> {
        self.blocked.shift_remove(&id)
    }

    pub fn blocked_ids(&self) -> Vec<ItemId> {
        self.blocked.keys().copied().collect()
    }

    pub fn ids_for_in_blocked(&self, task: &T) -> Vec<ItemId> {
        self.blocked
            .values()
            .filter(|i| &i.core.task == task)
            .map(|i| i.core.id)
            .collect()
    }

    // --- buildable -----------------------------------------------------

    pub fn insert_buildable(&mut self, item: BuildableItem<T>) {
        self.buildable.insert(item.core.id, item);
    }

    pub fn remove_buildable(&mut self, id: ItemId) -> Option<BuildableItem<T>> {
        self.buildable.shift_remove(&id)
    }

    pub fn buildable_ids_in_order(&self) -> Vec<ItemId> {
        self.buildable.keys().copied().collect()
    }

    pub fn buildable_get(&self, id: ItemId) -> Option<&BuildableItem<T>> {
        self.buildable.get(&id)
    }

    /// Reshape the buildable map to iterate in `order` (§4.3 Phase C: a
    /// configured `QueueSorter` reorders buildables before dispatch). Ids
    /// not present in `order` keep their relative position at the end.
    pub fn reorder_buildable(&mut self, order: &[ItemId]) {
        let mut reordered = IndexMap::with_capacity(self.buildable.len());
        for id in order {
            if let Some(item) = self.buildable.shift_remove(id) {
                reordered.insert(*id, item);
            }
        }
        for (id, item) in self.buildable.drain(..) {
            reordered.insert(id, item);
        }
        self.buildable = reordered;
    }

    pub fn has_task_buildable(&self, task: &T) -> bool {
        self.buildable.values().any(|i| &i.core.task == task)
    }

    pub fn ids_for_in_buildable(&self, task: &T) -> Vec<ItemId> {
        self.buildable
            .values()
            .filter(|i| &i.core.task == task)
            .map(|i| i.core.id)
            .collect()
    }

    // --- pending -----------------------------------------------------

    pub fn insert_pending(&mut self, item: PendingItem<T>) {
        self.pending.insert(item.core.id, item);
    }

    pub fn remove_pending(&mut self, id: ItemId) -> Option<PendingItem<T>> {
        self.pending.shift_remove(&id)
    }

    pub fn pending_get(&self, id: ItemId) -> Option<&PendingItem<T>> {
        self.pending.get(&id)
    }

    pub fn has_task_pending(&self, task: &T) -> bool {
        self.pending.values().any(|i| &i.core.task == task)
    }

    pub fn ids_for_in_pending(&self, task: &T) -> Vec<ItemId> {
        self.pending
            .values()
            .filter(|i| &i.core.task == task)
            .map(|i| i.core.id)
            .collect()
    }

    // --- cross-stage queries -------------------------------------------

    /// All items whose task equals `task`, across every stage (§4.1 step 4).
    pub fn ids_for_task(&self, task: &T) -> Vec<ItemId> {
        let mut ids = self.waiting_ids_for(task);
        ids.extend(self.ids_for_in_blocked(task));
        ids.extend(self.ids_for_in_buildable(task));
        ids.extend(self.ids_for_in_pending(task));
        ids
    }

    pub fn contains_task(&self, task: &T) -> bool {
        !self.ids_for_task(task).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
            && self.blocked.is_empty()
            && self.buildable.is_empty()
            && self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.waiting.len() + self.blocked.len() + self.buildable.len() + self.pending.len()
    }

    /// Find an item by id, across every stage.
    pub fn find(&self, id: ItemId) -> Option<ItemRef<'_, T>> {
        if let Some(i) = self.waiting.values().find(|i| i.core.id == id) {
            return Some(ItemRef::Waiting(i));
        }
        if let Some(i) = self.blocked.get(&id) {
            return Some(ItemRef::Blocked(i));
        }
        if let Some(i) = self.buildable.get(&id) {
            return Some(ItemRef::Buildable(i));
        }
        if let Some(i) = self.pending.get(&id) {
            return Some(ItemRef::Pending(i));
        }
        None
    }

    /// Mutable access to an item's shared core, across every stage. Used
    /// by admission to fold actions into a duplicate in place (§4.1 step 6).
    pub fn core_mut(&mut self, id: ItemId) -> Option<&mut bq_core::ItemCore<T>> {
        if let Some(i) = self.waiting.values_mut().find(|i| i.core.id == id) {
            return Some(&mut i.core);
        }
        if let Some(i) = self.blocked.get_mut(&id) {
            return Some(&mut i.core);
        }
        if let Some(i) = self.buildable.get_mut(&id) {
            return Some(&mut i.core);
        }
        if let Some(i) = self.pending.get_mut(&id) {
            return Some(&mut i.core);
        }
        None
    }

    /// Snapshot every item, in `items()` order: waiting, blocked, buildable,
    /// pending (matching §6's `items()`).
    pub fn all_ids(&self) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = self.waiting.values().map(|i| i.core.id).collect();
        ids.extend(self.blocked.keys().copied());
        ids.extend(self.buildable.keys().copied());
        ids.extend(self.pending.keys().copied());
        ids
    }
}

/// A borrowed reference to an item found by id, tagged with its stage.
pub enum ItemRef<'a, T> {
    Waiting(&'a WaitingItem<T>),
    Blocked(&'a BlockedItem<T>),
    Buildable(&'a BuildableItem<T>),
    Pending(&'a PendingItem<T>),
}

impl<'a, T: Task> ItemRef<'a, T> {
    pub fn core(&self) -> &bq_core::ItemCore<T> {
        match self {
            ItemRef::Waiting(i) => &i.core,
            ItemRef::Blocked(i) => &i.core,
            ItemRef::Buildable(i) => &i.core,
            ItemRef::Pending(i) => &i.core,
        }
    }

    pub fn task(&self) -> &T {
        match self {
            ItemRef::Waiting(i) => &i.core.task,
            ItemRef::Blocked(i) => &i.core.task,
            ItemRef::Buildable(i) => &i.core.task,
            ItemRef::Pending(i) => &i.core.task,
        }
    }

    pub fn stage_name(&self) -> &'static str {
        match self {
            ItemRef::Waiting(_) => "waiting",
            ItemRef::Blocked(_) => "blocked",
            ItemRef::Buildable(_) => "buildable",
            ItemRef::Pending(_) => "pending",
        }
    }
}

#[cfg(test)]
#[path = "item_store_tests.rs"]
mod tests;
