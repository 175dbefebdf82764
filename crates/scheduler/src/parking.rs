// SPDX-License-Identifier: MIT

//! The executor-facing half of the scheduler (§4.8): `pop()` and the
//! parking protocol. Lives in its own file from `scheduler.rs` because it
//! is conceptually a different caller (an executor thread, not an
//! admission/maintenance caller) even though it's the same `impl` type.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use bq_core::{Clock, NodeId, Task, WorkUnit};

use crate::job_offer::JobOffer;
use crate::scheduler::Scheduler;

/// Floor on the sleep duration between maintenance passes while parked
/// (§4.8 step 2c): avoids busy-looping when the next waiting item is
/// already due.
const MIN_PARK_SLEEP: Duration = Duration::from_millis(100);

impl<T: Task, C: Clock> Scheduler<T, C> {
    /// Fetch the next work unit for `node_id`, blocking as needed (§4.8).
    ///
    /// `preassigned` covers the one-off executor case (step 1): a caller
    /// that already has a `WorkUnit` in hand — e.g. one placed directly
    /// through the flyweight fast path (§4.7), which never goes through
    /// the offer/park dance at all — just needs the scheduler's
    /// bookkeeping (pending removal, work-context cleanup) to catch up.
    pub async fn pop(&self, node_id: NodeId, preassigned: Option<WorkUnit<T>>) -> WorkUnit<T> {
        if let Some(unit) = preassigned {
            self.finish_pending(unit.item_id).await;
            return unit;
        }

        let offer_id = self.next_offer_id.fetch_add(1, Ordering::SeqCst);
        let offer = Arc::new(JobOffer::<T>::new(offer_id, node_id));
        self.offers.lock().register(offer.clone());
        let guard = PopGuard {
            scheduler: self,
            offer: offer.clone(),
            offer_id,
            armed: std::cell::Cell::new(true),
        };

        loop {
            self.maintain().await;

            let sleep = {
                let store = self.state.read().await;
                store.peek_waiting().map(|top| {
                    let now = self.clock.now();
                    top.due_at
                        .checked_duration_since(now)
                        .unwrap_or(Duration::ZERO)
                        .max(MIN_PARK_SLEEP)
                })
            };

            match sleep {
                Some(duration) => {
                    let _ = tokio::time::timeout(duration, offer.parked()).await;
                }
                None => offer.parked().await,
            }

            if let Some(unit) = offer.take_assignment() {
                self.offers.lock().unregister(offer_id);
                guard.disarm();
                if unit.is_main {
                    self.finish_pending(unit.item_id).await;
                }
                return unit;
            }
            // Spurious wake (another maintenance pass touched the parked
            // map without assigning this offer): loop and try again.
        }
    }

    /// Remove a dispatched item from pending and drop its tracked
    /// `WorkUnitContext`, once its main work unit has been claimed.
    async fn finish_pending(&self, item_id: bq_core::ItemId) {
        self.state.write().await.remove_pending(item_id);
        self.work_contexts.lock().remove(&item_id);
    }
}

/// RAII guard covering §4.8 step 3: if the executor's task is dropped
/// (interrupted or cancelled) while parked with an assignment already
/// set but not yet consumed, abort that work unit's context and wake
/// another idle offer so a different executor can pick it up.
struct PopGuard<'a, T: Task, C: Clock> {
    scheduler: &'a Scheduler<T, C>,
    offer: Arc<JobOffer<T>>,
    offer_id: u64,
    armed: std::cell::Cell<bool>,
}

impl<'a, T: Task, C: Clock> PopGuard<'a, T, C> {
    /// Call once the offer's assignment has been consumed normally —
    /// suppresses the abnormal-exit handling on drop.
    fn disarm(&self) {
        self.armed.set(false);
    }
}

impl<'a, T: Task, C: Clock> Drop for PopGuard<'a, T, C> {
    fn drop(&mut self) {
        if !self.armed.get() {
            return;
        }
        self.scheduler.offers.lock().unregister(self.offer_id);
        if let Some(unit) = self.offer.take_assignment() {
            tracing::warn!(
                item_id = %unit.item_id,
                node = %unit.node,
                "pop() dropped with an unconsumed assignment; aborting work unit context"
            );
            if let Some(context) = self.scheduler.work_contexts.lock().remove(&unit.item_id) {
                context.abort();
            }
            self.scheduler.schedule_maintenance();
        }
    }
}

#[cfg(test)]
#[path = "parking_tests.rs"]
mod tests;
