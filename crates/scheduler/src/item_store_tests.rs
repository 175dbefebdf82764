// SPDX-License-Identifier: MIT

use super::*;
use bq_core::test_support::FakeTask;
use bq_core::ItemCore;
use std::time::Duration;

fn waiting(store: &ItemStore<FakeTask>, task: &str, due_at: Instant) -> WaitingItem<FakeTask> {
    let (core, _rx) = ItemCore::new(store.alloc().next(), FakeTask::new(task), vec![], Instant::now());
    WaitingItem { core, due_at }
}

#[test]
fn waiting_set_orders_by_due_at_then_id() {
    let mut store = ItemStore::<FakeTask>::new(ItemIdAllocator::new());
    let now = Instant::now();
    let later = now + Duration::from_secs(10);

    let a = waiting(&store, "a", later);
    let a_id = a.core.id;
    store.insert_waiting(a);
    let b = waiting(&store, "b", now);
    let b_id = b.core.id;
    store.insert_waiting(b);

    assert_eq!(store.peek_waiting().expect("peek").core.id, b_id);
    let popped = store.pop_waiting().expect("pop");
    assert_eq!(popped.core.id, b_id);
    assert_eq!(store.peek_waiting().expect("peek").core.id, a_id);
}

#[test]
fn ids_for_task_spans_all_stages() {
    let mut store = ItemStore::<FakeTask>::new(ItemIdAllocator::new());
    let now = Instant::now();

    let w = waiting(&store, "build", now);
    store.insert_waiting(w);

    let (core, _rx) = ItemCore::new(store.alloc().next(), FakeTask::new("build"), vec![], now);
    store.insert_blocked(BlockedItem {
        core,
        entered_non_waiting_at: now,
    });

    let ids = store.ids_for_task(&FakeTask::new("build"));
    assert_eq!(ids.len(), 2);
    assert!(!store.contains_task(&FakeTask::new("other")));
}

#[test]
fn len_and_is_empty_track_all_stages() {
    let mut store = ItemStore::<FakeTask>::new(ItemIdAllocator::new());
    assert!(store.is_empty());
    let w = waiting(&store, "build", Instant::now());
    store.insert_waiting(w);
    assert_eq!(store.len(), 1);
    assert!(!store.is_empty());
}

#[test]
fn remove_waiting_by_id_removes_exact_item() {
    let mut store = ItemStore::<FakeTask>::new(ItemIdAllocator::new());
    let now = Instant::now();
    let a = waiting(&store, "a", now);
    let a_id = a.core.id;
    store.insert_waiting(a);
    let b = waiting(&store, "b", now + Duration::from_secs(1));
    store.insert_waiting(b);

    let removed = store.remove_waiting(a_id).expect("removed");
    assert_eq!(removed.core.id, a_id);
    assert_eq!(store.waiting_len(), 1);
}
