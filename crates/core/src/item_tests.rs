// SPDX-License-Identifier: MIT

use super::*;
use crate::test_support::FakeTask;

fn waiting(id: u64, due_at: Instant) -> (WaitingItem<FakeTask>, CompletionReceiver) {
    let (core, rx) = ItemCore::new(ItemId::new(id), FakeTask::new("a"), Vec::new(), Instant::now());
    (WaitingItem { core, due_at }, rx)
}

#[test]
fn resolve_sends_outcome_once() {
    let (mut wi, rx) = waiting(1, Instant::now());
    wi.core.resolve(ItemOutcome::Cancelled);
    // Second resolve is a no-op, does not panic or overwrite.
    wi.core.resolve(ItemOutcome::Started(WorkUnitId::new(1)));
    let outcome = rx.try_recv().unwrap();
    assert!(matches!(outcome, ItemOutcome::Cancelled));
}

#[test]
fn stage_transitions_preserve_id_and_in_queue_since() {
    let (wi, _rx) = waiting(42, Instant::now());
    let since = wi.core.in_queue_since;
    let blocked = wi.into_blocked(Instant::now());
    assert_eq!(blocked.core.id, ItemId::new(42));
    assert_eq!(blocked.core.in_queue_since, since);

    let buildable = blocked.into_buildable();
    assert_eq!(buildable.core.id, ItemId::new(42));
    assert_eq!(buildable.core.in_queue_since, since);

    let pending = buildable.into_pending();
    assert_eq!(pending.core.id, ItemId::new(42));
    assert_eq!(pending.core.in_queue_since, since);
}

#[test]
fn item_enum_reports_stage_name() {
    let (wi, _rx) = waiting(1, Instant::now());
    let item = Item::Waiting(wi);
    assert_eq!(item.stage_name(), "waiting");
    assert_eq!(item.id(), ItemId::new(1));
}
