// SPDX-License-Identifier: MIT

//! The top-level `Scheduler` type (§6): owns every stage container, the
//! extension-point registries, and the collaborators maintenance and
//! parking consult. Its `impl` block is split across this crate's other
//! modules, each owning the methods for one concern — `quiet_period.rs`
//! for admission/cancellation wrappers, `parking.rs` for `pop()`, and so
//! on — mirroring how a single large type's behavior is grouped by
//! concern rather than crammed into one file.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use bq_core::{
    Action, Clock, ItemId, ItemOutcome, Node, ResourceController, SystemClock, Task,
    WorkUnitContext, WorkUnitIdAllocator,
};
use parking_lot::{Mutex as SyncMutex, RwLock as SyncRwLock};
use tokio::sync::{Mutex as AsyncMutex, RwLock as AsyncRwLock};
use tracing::instrument;

use crate::assignment::{FirstFitLoadBalancer, LoadBalancer};
use crate::config::SchedulerConfig;
use crate::decision::{QueueDecisionHandler, QueueSorter, QueueTaskDispatcher};
use crate::error::SchedulerError;
use crate::flyweight::HashRing;
use crate::item_store::ItemStore;
use crate::job_offer::ParkedOffers;
use crate::quiet_period::{self, AdmissionOutcome};
use crate::snapshot_cache::SnapshotCache;

/// The build queue scheduler (§2). Generic over the caller's task type
/// and, for tests, a swappable [`Clock`].
pub struct Scheduler<T: Task, C: Clock = SystemClock> {
    pub(crate) config: SchedulerConfig,
    pub(crate) clock: C,
    pub(crate) state: AsyncRwLock<ItemStore<T>>,
    pub(crate) maintenance_lock: AsyncMutex<()>,
    pub(crate) resources: ResourceController,
    pub(crate) decision_handlers: SyncRwLock<Vec<Arc<dyn QueueDecisionHandler<T>>>>,
    pub(crate) dispatchers: SyncRwLock<Vec<Arc<dyn QueueTaskDispatcher<T>>>>,
    pub(crate) sorter: SyncRwLock<Option<Arc<dyn QueueSorter<T>>>>,
    pub(crate) load_balancer: SyncRwLock<Arc<dyn LoadBalancer<T>>>,
    pub(crate) nodes: SyncRwLock<Vec<Arc<dyn Node>>>,
    pub(crate) flyweight_ring: SyncRwLock<HashRing>,
    pub(crate) quiescing: AtomicBool,
    pub(crate) work_unit_ids: WorkUnitIdAllocator,
    pub(crate) offers: SyncMutex<ParkedOffers<T>>,
    pub(crate) next_offer_id: AtomicU64,
    pub(crate) work_contexts: SyncMutex<HashMap<ItemId, WorkUnitContext<T>>>,
    pub(crate) snapshot_cache: SnapshotCache<T>,
}

impl<T: Task> Scheduler<T, SystemClock> {
    pub fn new(config: SchedulerConfig) -> Arc<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<T: Task, C: Clock> Scheduler<T, C> {
    pub fn with_clock(config: SchedulerConfig, clock: C) -> Arc<Self> {
        let staleness = config.snapshot_staleness_window;
        Arc::new(Self {
            config,
            clock,
            state: AsyncRwLock::new(ItemStore::new(bq_core::ItemIdAllocator::new())),
            maintenance_lock: AsyncMutex::new(()),
            resources: ResourceController::new(),
            decision_handlers: SyncRwLock::new(Vec::new()),
            dispatchers: SyncRwLock::new(Vec::new()),
            sorter: SyncRwLock::new(None),
            load_balancer: SyncRwLock::new(Arc::new(FirstFitLoadBalancer)),
            nodes: SyncRwLock::new(Vec::new()),
            flyweight_ring: SyncRwLock::new(HashRing::build(&[])),
            quiescing: AtomicBool::new(false),
            work_unit_ids: WorkUnitIdAllocator::new(),
            offers: SyncMutex::new(ParkedOffers::new()),
            next_offer_id: AtomicU64::new(1),
            work_contexts: SyncMutex::new(HashMap::new()),
            snapshot_cache: SnapshotCache::new(staleness),
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// The resource conflict matrix consulted by block evaluation (§4.4,
    /// §5). Exposed so the embedding executor layer — out of scope here —
    /// can release a pending item's resources once its work unit
    /// finishes; this scheduler only ever reserves, never releases.
    pub fn resources(&self) -> &ResourceController {
        &self.resources
    }

    // --- node registry ---------------------------------------------------

    /// Replace the known node set and rebuild the flyweight hash ring
    /// (§4.7 step 1: the ring only reshapes when the node set changes).
    ///
    /// Master nodes are sticky across calls: the master node is always
    /// included in the ring (§4.7 step 1), so if a previously-seen master
    /// node is absent from `nodes` it is carried forward rather than
    /// silently dropped. A master node present in `nodes` always
    /// supersedes a stale one with the same id.
    pub fn set_nodes(&self, nodes: Vec<Arc<dyn Node>>) {
        let mut effective = nodes;
        for old in self.nodes.read().iter() {
            if old.is_master() && !effective.iter().any(|n| n.id() == old.id()) {
                effective.push(old.clone());
            }
        }
        let ring = HashRing::build(&effective);
        *self.nodes.write() = effective;
        *self.flyweight_ring.write() = ring;
    }

    pub fn set_quiescing(&self, quiescing: bool) {
        self.quiescing.store(quiescing, Ordering::SeqCst);
    }

    // --- extension-point registries --------------------------------------

    pub fn add_decision_handler(&self, handler: Arc<dyn QueueDecisionHandler<T>>) {
        self.decision_handlers.write().push(handler);
    }

    pub fn add_dispatcher(&self, dispatcher: Arc<dyn QueueTaskDispatcher<T>>) {
        self.dispatchers.write().push(dispatcher);
    }

    pub fn sorter(&self) -> Option<Arc<dyn QueueSorter<T>>> {
        self.sorter.read().clone()
    }

    pub fn set_sorter(&self, sorter: Option<Arc<dyn QueueSorter<T>>>) {
        *self.sorter.write() = sorter;
    }

    pub fn load_balancer(&self) -> Arc<dyn LoadBalancer<T>> {
        self.load_balancer.read().clone()
    }

    pub fn set_load_balancer(&self, balancer: Arc<dyn LoadBalancer<T>>) {
        *self.load_balancer.write() = balancer;
    }

    // --- admission / cancellation (§4.1, §4.2) ---------------------------

    #[instrument(skip(self, actions))]
    pub async fn schedule(
        &self,
        task: T,
        quiet_period: Option<std::time::Duration>,
        actions: Vec<Box<dyn Action<T>>>,
    ) -> Option<ItemId> {
        let quiet_period = quiet_period.unwrap_or(self.config.default_quiet_period);
        let outcome = {
            let mut store = self.state.write().await;
            let alloc = store.alloc().clone();
            quiet_period::schedule(
                &mut store,
                &alloc,
                &self.clock,
                task,
                quiet_period,
                actions,
                &self.decision_handlers.read().clone(),
            )
        };
        match outcome {
            AdmissionOutcome::Admitted(id) => {
                tracing::debug!(item_id = %id, "admitted new item");
                self.schedule_maintenance();
                Some(id)
            }
            AdmissionOutcome::Coalesced => {
                tracing::debug!("submission coalesced into an existing duplicate");
                None
            }
            AdmissionOutcome::Vetoed => {
                tracing::debug!("submission vetoed by a decision handler");
                None
            }
        }
    }

    pub async fn cancel_task(&self, task: &T) -> bool {
        let removed = {
            let mut store = self.state.write().await;
            quiet_period::cancel_task(&mut store, task)
        };
        if removed {
            self.schedule_maintenance();
        }
        removed
    }

    pub async fn cancel_item(&self, id: ItemId) -> bool {
        let removed = {
            let mut store = self.state.write().await;
            quiet_period::cancel_item(&mut store, id)
        };
        if removed {
            self.schedule_maintenance();
        }
        removed
    }

    /// Cancel everything in waiting/blocked/buildable (§6: `clear()`).
    /// Pending items, already handed to an executor, are left alone.
    pub async fn clear(&self) {
        let mut store = self.state.write().await;
        for id in store.waiting_ids() {
            if let Some(mut item) = store.remove_waiting(id) {
                item.core.resolve(ItemOutcome::Cancelled);
            }
        }
        for id in store.blocked_ids() {
            if let Some(mut item) = store.remove_blocked(id) {
                item.core.resolve(ItemOutcome::Cancelled);
            }
        }
        for id in store.buildable_ids_in_order() {
            if let Some(mut item) = store.remove_buildable(id) {
                item.core.resolve(ItemOutcome::Cancelled);
            }
        }
        drop(store);
        self.schedule_maintenance();
    }

    // --- read-only views (§6) --------------------------------------------

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.is_empty()
    }

    pub async fn contains(&self, task: &T) -> bool {
        self.state.read().await.contains_task(task)
    }

    pub async fn is_pending(&self, task: &T) -> bool {
        self.state.read().await.has_task_pending(task)
    }

    pub async fn items_for(&self, task: &T) -> Vec<ItemId> {
        self.state.read().await.ids_for_task(task)
    }

    pub async fn count_buildable_items(&self) -> usize {
        self.state.read().await.buildable_ids_in_order().len()
    }

    pub async fn count_buildable_items_for(&self, label: &str) -> usize {
        let store = self.state.read().await;
        store
            .buildable_ids_in_order()
            .into_iter()
            .filter(|id| {
                store
                    .buildable_get(*id)
                    .and_then(|b| b.core.task.assigned_label())
                    .as_deref()
                    == Some(label)
            })
            .count()
    }

    /// `approximateItems()` (§4.10): bounded-staleness read, avoiding lock
    /// contention for UI-style consumers.
    pub async fn approximate_items(&self) -> Vec<(ItemId, T, &'static str)> {
        let now = self.clock.now();
        let store_read = self.state.read().await;
        self.snapshot_cache.get_or_build(now, || {
            store_read
                .all_ids()
                .into_iter()
                .filter_map(|id| {
                    store_read
                        .find(id)
                        .map(|r| (id, r.task().clone(), r.stage_name()))
                })
                .collect()
        })
    }

    // --- maintenance triggers ---------------------------------------------

    /// Wake one idle parked offer (if any) so it re-enters its `pop()`
    /// loop and runs `maintain()` itself. §6: `scheduleMaintenance()`.
    pub fn schedule_maintenance(&self) {
        if let Some(offer) = self.offers.lock().first_idle() {
            offer.notify();
        }
    }

    #[instrument(skip(self))]
    pub async fn maintain(&self) {
        let _permit = self.maintenance_lock.lock().await;
        let now = self.clock.now();
        let nodes = self.nodes.read().clone();
        let dispatchers = self.dispatchers.read().clone();
        let ring = self.flyweight_ring.read().clone();
        let sorter = self.sorter.read().clone();
        let balancer = self.load_balancer.read().clone();

        let ctx = crate::maintenance::MaintenanceContext {
            resources: &self.resources,
            dispatchers: &dispatchers,
            nodes: &nodes,
            flyweight_ring: &ring,
            quiescing: self.quiescing.load(Ordering::SeqCst),
            sorter: sorter.as_deref(),
            load_balancer: balancer.as_ref(),
            work_unit_ids: &self.work_unit_ids,
        };

        let mut store = self.state.write().await;
        let offers = self.offers.lock();
        crate::maintenance::maintain(&mut store, &ctx, &offers, &self.work_contexts, now);
    }

    // --- persistence (§4.9) -----------------------------------------------

    pub async fn save(&self) -> Result<(), SchedulerError> {
        let store = self.state.read().await;
        crate::persistence::save(&self.config.persistence_path, &store, &self.clock)
    }

    pub async fn load(
        &self,
        resolver: &impl bq_storage::TaskResolver<T>,
    ) -> Result<(), SchedulerError> {
        let outcome = crate::persistence::load(
            &self.config.persistence_path,
            resolver,
            &self.clock,
            self.config.max_backup_generations,
        )?;

        {
            let mut store = self.state.write().await;
            for item in outcome.waiting {
                store.insert_waiting(item);
            }
            for item in outcome.blocked {
                store.insert_blocked(item);
            }
            for item in outcome.buildable {
                store.insert_buildable(item);
            }
            if let Some(max_id) = outcome.max_id_seen {
                store.alloc().seed(max_id);
            }
        }

        for name in outcome.legacy_task_names {
            if let Some(task) = resolver.resolve(&name) {
                self.schedule(task, Some(std::time::Duration::ZERO), Vec::new())
                    .await;
            } else {
                tracing::warn!(task_name = %name, "dropping unresolved legacy task name");
            }
        }

        self.schedule_maintenance();
        Ok(())
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
