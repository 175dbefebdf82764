// SPDX-License-Identifier: MIT

use super::*;
use bq_core::test_support::FakeTask;
use bq_core::{ItemId, WorkUnitId};

fn unit(id: u64) -> WorkUnit<FakeTask> {
    WorkUnit {
        id: WorkUnitId::new(id),
        item_id: ItemId::new(id),
        task: FakeTask::new("build"),
        node: NodeId::new(1),
        is_main: true,
    }
}

#[test]
fn offer_starts_unassigned() {
    let offer = JobOffer::<FakeTask>::new(1, NodeId::new(1));
    assert!(!offer.is_assigned());
    assert!(offer.take_assignment().is_none());
}

#[test]
fn set_assigns_and_wakes() {
    let offer = JobOffer::<FakeTask>::new(1, NodeId::new(1));
    offer.set(unit(7));
    assert!(offer.is_assigned());
    let assigned = offer.take_assignment().expect("assignment");
    assert_eq!(assigned.id, WorkUnitId::new(7));
    assert!(!offer.is_assigned());
}

#[test]
#[should_panic(expected = "assigned twice")]
fn set_twice_panics_in_debug() {
    let offer = JobOffer::<FakeTask>::new(1, NodeId::new(1));
    offer.set(unit(1));
    offer.set(unit(2));
}

#[test]
fn parked_offers_tracks_idle_entries() {
    let mut parked = ParkedOffers::<FakeTask>::new();
    assert!(parked.is_empty());

    let a = std::sync::Arc::new(JobOffer::<FakeTask>::new(1, NodeId::new(1)));
    let b = std::sync::Arc::new(JobOffer::<FakeTask>::new(2, NodeId::new(2)));
    parked.register(a.clone());
    parked.register(b.clone());

    assert_eq!(parked.first_idle().map(|o| o.offer_id()), Some(1));

    a.set(unit(1));
    assert_eq!(parked.first_idle().map(|o| o.offer_id()), Some(2));

    parked.unregister(1);
    parked.unregister(2);
    assert!(parked.is_empty());
}
