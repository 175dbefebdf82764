// SPDX-License-Identifier: MIT

//! The parking protocol's other half: [`JobOffer`] is the idle state of
//! an executor waiting inside `pop()` (§4.6, §4.8). `ParkedOffers` is the
//! "parked map" maintenance consults when dispatching buildable items.

use std::sync::Arc;

use bq_core::{Node, NodeId, Task, WorkUnit};
use parking_lot::Mutex;
use tokio::sync::Notify;

/// An idle executor parked inside the scheduler awaiting an assignment.
///
/// Exactly one `JobOffer` exists per parked executor (§4.8 step 2a).
/// `set()` may only be called once — asserted in debug builds, matching
/// §4.6's "it is illegal to call twice".
pub struct JobOffer<T: Task> {
    offer_id: u64,
    node_id: NodeId,
    assignment: Mutex<Option<WorkUnit<T>>>,
    wake: Notify,
}

impl<T: Task> JobOffer<T> {
    pub fn new(offer_id: u64, node_id: NodeId) -> Self {
        Self {
            offer_id,
            node_id,
            assignment: Mutex::new(None),
            wake: Notify::new(),
        }
    }

    pub fn offer_id(&self) -> u64 {
        self.offer_id
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn is_assigned(&self) -> bool {
        self.assignment.lock().is_some()
    }

    pub fn take_assignment(&self) -> Option<WorkUnit<T>> {
        self.assignment.lock().take()
    }

    /// Assign a work unit and wake the parked executor. Illegal to call
    /// on an already-assigned offer (§4.6).
    pub fn set(&self, unit: WorkUnit<T>) {
        let mut guard = self.assignment.lock();
        debug_assert!(guard.is_none(), "job offer assigned twice");
        *guard = Some(unit);
        drop(guard);
        self.wake.notify_one();
    }

    /// Suspend until woken by `set()`, a spurious maintenance wake, or the
    /// given deadline, whichever comes first.
    pub async fn parked(&self) {
        self.wake.notified().await;
    }

    pub fn notify(&self) {
        self.wake.notify_one();
    }

    /// True iff this offer's node exists, is online, and accepting tasks
    /// — the node-level half of §4.6's `canTake` contract. Label/resource
    /// matching and dispatcher vetoes are evaluated by the caller, which
    /// has the item in hand.
    pub fn node_is_eligible(node: &Arc<dyn Node>) -> bool {
        node.is_online() && node.is_accepting_tasks()
    }
}

/// The scheduler's registry of currently-parked executors (§4.6, §4.8).
#[derive(Default)]
pub struct ParkedOffers<T: Task> {
    offers: Vec<Arc<JobOffer<T>>>,
}

impl<T: Task> ParkedOffers<T> {
    pub fn new() -> Self {
        Self { offers: Vec::new() }
    }

    pub fn register(&mut self, offer: Arc<JobOffer<T>>) {
        debug_assert!(
            !self.offers.iter().any(|o| o.offer_id() == offer.offer_id()),
            "duplicate job offer registration"
        );
        self.offers.push(offer);
    }

    pub fn unregister(&mut self, offer_id: u64) {
        self.offers.retain(|o| o.offer_id() != offer_id);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<JobOffer<T>>> {
        self.offers.iter()
    }

    /// First parked offer with no assigned work unit (§4.3: `scheduleMaintenance`
    /// wakes exactly one idle offer).
    pub fn first_idle(&self) -> Option<&Arc<JobOffer<T>>> {
        self.offers.iter().find(|o| !o.is_assigned())
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }
}

#[cfg(test)]
#[path = "job_offer_tests.rs"]
mod tests;
