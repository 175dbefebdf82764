// SPDX-License-Identifier: MIT

use super::*;
use bq_core::test_support::FakeTask;
use bq_core::FakeClock;
use std::sync::Arc;

struct VetoAll;
impl QueueDecisionHandler<FakeTask> for VetoAll {
    fn should_schedule(&self, _task: &FakeTask, _actions: &[Box<dyn Action<FakeTask>>]) -> bool {
        false
    }
}

#[derive(Debug)]
struct ScheduleAnyway;
impl Action<FakeTask> for ScheduleAnyway {
    fn should_schedule(&self, _other_actions: &[Box<dyn Action<FakeTask>>]) -> Option<bool> {
        Some(true)
    }
}

fn store() -> ItemStore<FakeTask> {
    ItemStore::new(ItemIdAllocator::new())
}

#[test]
fn first_submission_admits_a_new_waiting_item() {
    let mut s = store();
    let alloc = s.alloc().clone();
    let clock = FakeClock::new();
    let outcome = schedule(
        &mut s,
        &alloc,
        &clock,
        FakeTask::new("build"),
        Duration::from_secs(10),
        Vec::new(),
        &[],
    );
    assert!(matches!(outcome, AdmissionOutcome::Admitted(_)));
    assert_eq!(s.waiting_len(), 1);
}

#[test]
fn decision_handler_veto_blocks_admission() {
    let mut s = store();
    let alloc = s.alloc().clone();
    let clock = FakeClock::new();
    let handlers: Vec<Arc<dyn QueueDecisionHandler<FakeTask>>> = vec![Arc::new(VetoAll)];
    let outcome = schedule(
        &mut s,
        &alloc,
        &clock,
        FakeTask::new("build"),
        Duration::from_secs(10),
        Vec::new(),
        &handlers,
    );
    assert!(matches!(outcome, AdmissionOutcome::Vetoed));
    assert!(s.is_empty());
}

#[test]
fn duplicate_with_longer_quiet_period_pushes_due_at_later() {
    let mut s = store();
    let alloc = s.alloc().clone();
    let clock = FakeClock::new();
    schedule(
        &mut s,
        &alloc,
        &clock,
        FakeTask::new("build"),
        Duration::from_secs(5),
        Vec::new(),
        &[],
    );
    let first_due = s.peek_waiting().unwrap().due_at;

    let outcome = schedule(
        &mut s,
        &alloc,
        &clock,
        FakeTask::new("build"),
        Duration::from_secs(30),
        Vec::new(),
        &[],
    );
    assert!(matches!(outcome, AdmissionOutcome::Coalesced));
    assert_eq!(s.waiting_len(), 1);
    assert!(s.peek_waiting().unwrap().due_at > first_due);
}

#[test]
fn duplicate_with_zero_quiet_period_pulls_due_at_earlier() {
    let mut s = store();
    let alloc = s.alloc().clone();
    let clock = FakeClock::new();
    schedule(
        &mut s,
        &alloc,
        &clock,
        FakeTask::new("build"),
        Duration::from_secs(30),
        Vec::new(),
        &[],
    );
    let first_due = s.peek_waiting().unwrap().due_at;

    schedule(
        &mut s,
        &alloc,
        &clock,
        FakeTask::new("build"),
        Duration::ZERO,
        Vec::new(),
        &[],
    );
    assert_eq!(s.waiting_len(), 1);
    assert!(s.peek_waiting().unwrap().due_at < first_due);
}

#[test]
fn duplicate_never_moves_due_at_backwards_on_longer_request() {
    let mut s = store();
    let alloc = s.alloc().clone();
    let clock = FakeClock::new();
    schedule(
        &mut s,
        &alloc,
        &clock,
        FakeTask::new("build"),
        Duration::from_secs(30),
        Vec::new(),
        &[],
    );
    let first_due = s.peek_waiting().unwrap().due_at;

    schedule(
        &mut s,
        &alloc,
        &clock,
        FakeTask::new("build"),
        Duration::from_secs(5),
        Vec::new(),
        &[],
    );
    assert_eq!(s.peek_waiting().unwrap().due_at, first_due);
}

#[test]
fn schedule_anyway_action_admits_a_new_item_despite_existing_duplicate() {
    let mut s = store();
    let alloc = s.alloc().clone();
    let clock = FakeClock::new();
    schedule(
        &mut s,
        &alloc,
        &clock,
        FakeTask::new("build"),
        Duration::from_secs(30),
        Vec::new(),
        &[],
    );
    assert_eq!(s.waiting_len(), 1);

    let outcome = schedule(
        &mut s,
        &alloc,
        &clock,
        FakeTask::new("build"),
        Duration::from_secs(30),
        vec![Box::new(ScheduleAnyway)],
        &[],
    );

    assert!(matches!(outcome, AdmissionOutcome::Admitted(_)));
    assert_eq!(s.waiting_len(), 2);
}

#[test]
fn cancel_task_removes_first_occurrence_in_waiting() {
    let mut s = store();
    let alloc = s.alloc().clone();
    let clock = FakeClock::new();
    let task = FakeTask::new("build");
    schedule(&mut s, &alloc, &clock, task.clone(), Duration::ZERO, Vec::new(), &[]);
    assert!(cancel_task(&mut s, &task));
    assert!(s.is_empty());
    assert!(!cancel_task(&mut s, &task));
}

#[test]
fn cancel_item_removes_by_identity() {
    let mut s = store();
    let alloc = s.alloc().clone();
    let clock = FakeClock::new();
    let outcome = schedule(
        &mut s,
        &alloc,
        &clock,
        FakeTask::new("build"),
        Duration::ZERO,
        Vec::new(),
        &[],
    );
    let AdmissionOutcome::Admitted(id) = outcome else {
        panic!("expected admission");
    };
    assert!(cancel_item(&mut s, id));
    assert!(s.is_empty());
}
