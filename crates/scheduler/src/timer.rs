// SPDX-License-Identifier: MIT

//! The periodic maintenance backstop (§5): a liveness net for when every
//! executor is busy and nothing calls `pop()` to drive `maintain()`
//! forward on its own.

use std::sync::Arc;

use bq_core::{Clock, Task};

use crate::scheduler::Scheduler;

/// Spawn a task that calls `scheduler.maintain()` on every tick of
/// `config().maintenance_tick_interval`. Holds only a `Weak` reference —
/// once the scheduler is dropped, the next tick's `upgrade()` fails and
/// the task exits on its own.
pub fn spawn<T: Task, C: Clock>(scheduler: &Arc<Scheduler<T, C>>) -> tokio::task::JoinHandle<()> {
    let weak = Arc::downgrade(scheduler);
    let interval = scheduler.config().maintenance_tick_interval;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let Some(scheduler) = weak.upgrade() else {
                tracing::debug!("scheduler dropped, stopping maintenance timer");
                return;
            };
            scheduler.maintain().await;
        }
    })
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
