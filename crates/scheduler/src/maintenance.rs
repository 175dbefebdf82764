// SPDX-License-Identifier: MIT

//! The three-phase maintenance loop (§4.3): unblock, drain waiting,
//! dispatch. Serialization (at most one `maintain()` in flight) is the
//! caller's responsibility — these functions assume exclusive access to
//! `store` for their duration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use bq_core::{
    resolve_label, BuildableItem, Item, ItemId, ItemOutcome, Node, ResourceController, Task,
    TaskRequirements, WorkUnit, WorkUnitContext, WorkUnitIdAllocator,
};
use parking_lot::Mutex;

use crate::assignment::{offer_can_take, CandidateOffer, LoadBalancer, MappingWorksheet};
use crate::block::{concurrency_allows, is_still_blocked};
use crate::decision::{BuildableSortKey, QueueSorter, QueueTaskDispatcher};
use crate::flyweight::{pick_flyweight_node, HashRing};
use crate::item_store::ItemStore;
use crate::job_offer::ParkedOffers;

/// Everything a maintenance pass needs beyond the item store itself.
pub struct MaintenanceContext<'a, T: Task> {
    pub resources: &'a ResourceController,
    pub dispatchers: &'a [Arc<dyn QueueTaskDispatcher<T>>],
    pub nodes: &'a [Arc<dyn Node>],
    pub flyweight_ring: &'a HashRing,
    pub quiescing: bool,
    pub sorter: Option<&'a dyn QueueSorter<T>>,
    pub load_balancer: &'a dyn LoadBalancer<T>,
    pub work_unit_ids: &'a WorkUnitIdAllocator,
}

impl<'a, T: Task> MaintenanceContext<'a, T> {
    fn find_node(&self, id: bq_core::NodeId) -> Option<Arc<dyn Node>> {
        self.nodes.iter().find(|n| n.id() == id).cloned()
    }
}

/// Run all three phases once.
pub fn maintain<T: Task>(
    store: &mut ItemStore<T>,
    ctx: &MaintenanceContext<'_, T>,
    offers: &ParkedOffers<T>,
    work_contexts: &Mutex<HashMap<ItemId, WorkUnitContext<T>>>,
    now: Instant,
) {
    run_phase_a(store, ctx, now);
    run_phase_b(store, ctx, now);
    run_phase_c(store, ctx, offers, work_contexts);
}

/// Phase A: re-check every blocked item; promote the ones no longer
/// blocked and concurrency-allowed.
fn run_phase_a<T: Task>(store: &mut ItemStore<T>, ctx: &MaintenanceContext<'_, T>, now: Instant) {
    let snapshot = store.blocked_ids();
    let mut promote = Vec::new();

    for id in snapshot {
        let Some(item) = store.remove_blocked(id) else {
            continue;
        };
        let wrapped = Item::Blocked(item);
        let still_blocked = is_still_blocked(&wrapped, ctx.resources, ctx.dispatchers);
        let Item::Blocked(item) = wrapped else {
            unreachable!("wrapped as Blocked above")
        };
        if !still_blocked && concurrency_allows(&item.core.task, store) {
            promote.push(item);
        } else {
            store.insert_blocked(item);
        }
    }

    for item in promote {
        make_buildable(store, item.into_buildable(), ctx, now);
    }
}

/// Phase B: drain every waiting item whose quiet period has elapsed.
fn run_phase_b<T: Task>(store: &mut ItemStore<T>, ctx: &MaintenanceContext<'_, T>, now: Instant) {
    loop {
        match store.peek_waiting() {
            Some(top) if top.due_at <= now => {}
            _ => break,
        }
        let Some(top) = store.pop_waiting() else {
            break;
        };
        let wrapped = Item::Waiting(top);
        let still_blocked = is_still_blocked(&wrapped, ctx.resources, ctx.dispatchers);
        let Item::Waiting(top) = wrapped else {
            unreachable!("wrapped as Waiting above")
        };

        if !still_blocked && concurrency_allows(&top.core.task, store) {
            make_buildable(store, top.into_buildable(now), ctx, now);
        } else {
            store.insert_blocked(top.into_blocked(now));
        }
    }
}

/// `makeBuildable` (§4.7): either place the item directly via the
/// flyweight fast path, or fall through to the ordinary buildable stage.
fn make_buildable<T: Task>(
    store: &mut ItemStore<T>,
    mut item: BuildableItem<T>,
    ctx: &MaintenanceContext<'_, T>,
    _now: Instant,
) {
    if item.core.task.is_flyweight() && !ctx.quiescing {
        let key = item.core.task.full_display_name();
        let label = resolve_label(
            &item.core.task,
            &item.core.actions,
            item.core.task.assigned_label(),
        );
        let resources = item.core.task.resource_list();
        let req = TaskRequirements {
            label: label.as_deref(),
            resources: &resources,
        };
        if let Some(node_id) = pick_flyweight_node(ctx.flyweight_ring, &key, req, ctx.nodes) {
            let work_unit_id = ctx.work_unit_ids.next();
            item.core.resolve(ItemOutcome::Started(work_unit_id));
            tracing::debug!(node = %node_id, task = %key, "flyweight task placed");
            ctx.resources
                .reserve(&item.core.task.resource_list(), item.core.id.get());
            store.insert_pending(item.into_pending());
            return;
        }
    }
    store.insert_buildable(item);
}

/// Phase C: reorder (if a sorter is configured), then dispatch each
/// buildable item to any eligible parked offer.
fn run_phase_c<T: Task>(
    store: &mut ItemStore<T>,
    ctx: &MaintenanceContext<'_, T>,
    offers: &ParkedOffers<T>,
    work_contexts: &Mutex<HashMap<ItemId, WorkUnitContext<T>>>,
) {
    if let Some(sorter) = ctx.sorter {
        let mut keys: Vec<BuildableSortKey> = store
            .buildable_ids_in_order()
            .into_iter()
            .filter_map(|id| {
                store.buildable_get(id).map(|b| BuildableSortKey {
                    id,
                    entered_non_waiting_at: b.entered_non_waiting_at,
                })
            })
            .collect();
        sorter.sort(&mut keys);
        let order: Vec<ItemId> = keys.iter().map(|k| k.id).collect();
        store.reorder_buildable(&order);
    }

    for id in store.buildable_ids_in_order() {
        let Some(item) = store.remove_buildable(id) else {
            continue;
        };
        let wrapped = Item::Buildable(item);

        if is_still_blocked(&wrapped, ctx.resources, ctx.dispatchers) {
            let Item::Buildable(item) = wrapped else {
                unreachable!("wrapped as Buildable above")
            };
            store.insert_blocked(item.into_blocked());
            continue;
        }

        let candidates: Vec<CandidateOffer> = offers
            .iter()
            .filter(|o| {
                let node = ctx.find_node(o.node_id());
                offer_can_take(o, node.as_ref(), &wrapped, ctx.dispatchers)
            })
            .map(|o| CandidateOffer {
                offer_id: o.offer_id(),
                node_id: o.node_id(),
            })
            .collect();

        let worksheet = MappingWorksheet {
            candidates: &candidates,
        };
        let mapping = ctx.load_balancer.map(wrapped.task(), &worksheet);

        let Some(mapping) = mapping else {
            let Item::Buildable(item) = wrapped else {
                unreachable!("wrapped as Buildable above")
            };
            store.insert_buildable(item);
            continue;
        };

        let Item::Buildable(mut item) = wrapped else {
            unreachable!("wrapped as Buildable above")
        };

        if !mapping.has_main() {
            // No main placement: nothing actually leaves buildable, so no
            // offer is consumed either.
            store.insert_buildable(item);
            continue;
        }

        let context = WorkUnitContext::new(item.core.id, item.core.task.clone());
        for assignment in &mapping.assignments {
            if let Some(offer) = offers.iter().find(|o| o.offer_id() == assignment.offer_id) {
                let work_unit_id = ctx.work_unit_ids.next();
                offer.set(WorkUnit {
                    id: work_unit_id,
                    item_id: item.core.id,
                    task: item.core.task.clone(),
                    node: assignment.node_id,
                    is_main: assignment.is_main,
                });
                if assignment.is_main {
                    item.core.resolve(ItemOutcome::Started(work_unit_id));
                }
            }
        }

        ctx.resources
            .reserve(&item.core.task.resource_list(), item.core.id.get());
        work_contexts.lock().insert(item.core.id, context);
        store.insert_pending(item.into_pending());
    }
}

#[cfg(test)]
#[path = "maintenance_tests.rs"]
mod tests;
