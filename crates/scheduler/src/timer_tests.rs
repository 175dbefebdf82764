// SPDX-License-Identifier: MIT

use super::*;
use crate::config::SchedulerConfig;
use crate::scheduler::Scheduler;
use bq_core::test_support::FakeTask;
use bq_core::SystemClock;
use std::sync::Arc;
use std::time::Duration;

fn new_scheduler(path: std::path::PathBuf) -> Arc<Scheduler<FakeTask, SystemClock>> {
    let config = SchedulerConfig {
        maintenance_tick_interval: Duration::from_millis(20),
        persistence_path: path,
        ..Default::default()
    };
    Scheduler::new(config)
}

#[tokio::test(start_paused = true)]
async fn periodic_tick_drives_a_waiting_item_to_buildable_without_pop_or_manual_maintain() {
    let dir = tempfile::tempdir().unwrap();
    let s = new_scheduler(dir.path().join("queue.json"));
    s.schedule(FakeTask::new("build"), Some(Duration::ZERO), Vec::new())
        .await;

    let handle = spawn(&s);
    tokio::time::advance(Duration::from_millis(25)).await;
    // yield so the spawned tick has a chance to run after the clock moves
    tokio::task::yield_now().await;

    assert_eq!(s.count_buildable_items().await, 1);
    handle.abort();
}

#[tokio::test(start_paused = true)]
async fn timer_exits_once_the_scheduler_is_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let s = new_scheduler(dir.path().join("queue.json"));
    let handle = spawn(&s);
    drop(s);

    tokio::time::advance(Duration::from_millis(25)).await;
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("timer task should join after its weak upgrade fails")
        .expect("timer task should not panic");
}
