// SPDX-License-Identifier: MIT

//! Bridges the in-memory item store to `bq_storage`'s queue file (§4.9).
//!
//! Persisted timestamps are epoch-ms wall-clock values, but the item
//! store orders and ages items by `Instant`, which has no fixed epoch.
//! On load we reconstruct each `Instant` relative to now: `due_at`
//! becomes `now + (persisted_epoch_ms - current_epoch_ms)`, clamped to
//! zero if that would be in the past. This preserves relative ordering
//! and "already due" semantics without needing a monotonic-to-wall-clock
//! mapping.

use std::time::{Duration, Instant};

use bq_core::{BlockedItem, BuildableItem, Clock, ItemCore, ItemId, Task, WaitingItem};
use bq_storage::{LoadedQueue, PersistedItem, PersistedStage, TaskResolver};

use crate::error::SchedulerError;
use crate::item_store::ItemStore;

/// Build the ordered persisted record list for every waiting, blocked,
/// and buildable item whose task is persistent (§4.9: "excluding pending
/// and any item whose task is flagged transient").
pub fn snapshot_for_save<T: Task>(store: &ItemStore<T>, clock: &impl Clock) -> Vec<PersistedItem> {
    let now_instant = clock.now();
    let now_epoch = clock.epoch_ms();
    let to_epoch = |t: Instant| -> u64 {
        if t >= now_instant {
            now_epoch + (t - now_instant).as_millis() as u64
        } else {
            now_epoch.saturating_sub((now_instant - t).as_millis() as u64)
        }
    };

    let mut out = Vec::with_capacity(store.len());
    for id in store.waiting_ids() {
        if let Some(crate::item_store::ItemRef::Waiting(w)) = store.find(id) {
            if !w.core.task.is_persistent() {
                continue;
            }
            out.push(PersistedItem {
                id: w.core.id.get(),
                task_name: w.core.task.full_display_name(),
                in_queue_since_epoch_ms: to_epoch(w.core.in_queue_since),
                stage: PersistedStage::Waiting {
                    due_at_epoch_ms: to_epoch(w.due_at),
                },
            });
        }
    }
    for id in store.blocked_ids() {
        if let Some(crate::item_store::ItemRef::Blocked(b)) = store.find(id) {
            if !b.core.task.is_persistent() {
                continue;
            }
            out.push(PersistedItem {
                id: b.core.id.get(),
                task_name: b.core.task.full_display_name(),
                in_queue_since_epoch_ms: to_epoch(b.core.in_queue_since),
                stage: PersistedStage::Blocked,
            });
        }
    }
    for id in store.buildable_ids_in_order() {
        if let Some(crate::item_store::ItemRef::Buildable(b)) = store.find(id) {
            if !b.core.task.is_persistent() {
                continue;
            }
            out.push(PersistedItem {
                id: b.core.id.get(),
                task_name: b.core.task.full_display_name(),
                in_queue_since_epoch_ms: to_epoch(b.core.in_queue_since),
                stage: PersistedStage::Buildable,
            });
        }
    }
    out
}

/// Outcome of reading the queue file: items ready to insert directly into
/// their stage, plus any legacy task names that need re-scheduling
/// through the normal admission path (quiet period 0, per §4.9).
pub struct LoadOutcome<T> {
    pub waiting: Vec<WaitingItem<T>>,
    pub blocked: Vec<BlockedItem<T>>,
    pub buildable: Vec<BuildableItem<T>>,
    pub legacy_task_names: Vec<String>,
    pub max_id_seen: Option<ItemId>,
}

impl<T> Default for LoadOutcome<T> {
    fn default() -> Self {
        Self {
            waiting: Vec::new(),
            blocked: Vec::new(),
            buildable: Vec::new(),
            legacy_task_names: Vec::new(),
            max_id_seen: None,
        }
    }
}

pub fn load<T: Task>(
    path: &std::path::Path,
    resolver: &impl TaskResolver<T>,
    clock: &impl Clock,
    max_backup_generations: u32,
) -> Result<LoadOutcome<T>, SchedulerError> {
    let loaded = bq_storage::load(path, max_backup_generations)?;
    let mut outcome = LoadOutcome::default();

    match loaded {
        LoadedQueue::Missing => {}
        LoadedQueue::Legacy(names) => {
            outcome.legacy_task_names = names;
        }
        LoadedQueue::Structured(items) => {
            let now_instant = clock.now();
            let now_epoch = clock.epoch_ms();
            let to_instant = |epoch_ms: u64| -> Instant {
                if epoch_ms >= now_epoch {
                    now_instant + Duration::from_millis(epoch_ms - now_epoch)
                } else {
                    now_instant.checked_sub(Duration::from_millis(now_epoch - epoch_ms)).unwrap_or(now_instant)
                }
            };

            for persisted in items {
                let Some(task) = resolver.resolve(&persisted.task_name) else {
                    tracing::warn!(
                        task_name = %persisted.task_name,
                        item_id = persisted.id,
                        "dropping persisted item with unresolved task"
                    );
                    continue;
                };
                let id = ItemId::new(persisted.id);
                outcome.max_id_seen = Some(match outcome.max_id_seen {
                    Some(existing) if existing.get() >= id.get() => existing,
                    _ => id,
                });
                let in_queue_since = to_instant(persisted.in_queue_since_epoch_ms);
                let (core, _completion) = ItemCore::new(id, task, Vec::new(), in_queue_since);

                match persisted.stage {
                    PersistedStage::Waiting { due_at_epoch_ms } => {
                        outcome.waiting.push(WaitingItem {
                            core,
                            due_at: to_instant(due_at_epoch_ms),
                        });
                    }
                    PersistedStage::Blocked => {
                        outcome.blocked.push(BlockedItem {
                            core,
                            entered_non_waiting_at: in_queue_since,
                        });
                    }
                    PersistedStage::Buildable => {
                        outcome.buildable.push(BuildableItem {
                            core,
                            entered_non_waiting_at: in_queue_since,
                        });
                    }
                }
            }
        }
    }

    Ok(outcome)
}

pub fn save<T: Task>(
    path: &std::path::Path,
    store: &ItemStore<T>,
    clock: &impl Clock,
) -> Result<(), SchedulerError> {
    let items = snapshot_for_save(store, clock);
    bq_storage::save(path, &items)?;
    Ok(())
}

#[cfg(test)]
#[path = "persistence_tests.rs"]
mod tests;
