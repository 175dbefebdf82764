// SPDX-License-Identifier: MIT

use super::*;
use bq_core::test_support::{FakeNode, FakeTask};
use bq_core::{ItemCore, ItemId, WaitingItem};
use std::time::Instant;

fn item_with_label(label: Option<&str>) -> Item<FakeTask> {
    let mut task = FakeTask::new("build");
    if let Some(l) = label {
        task = task.with_label(l);
    }
    let (core, _rx) = ItemCore::new(ItemId::new(1), task, vec![], Instant::now());
    Item::Waiting(WaitingItem {
        core,
        due_at: Instant::now(),
    })
}

#[test]
fn offer_can_take_rejects_offline_node() {
    let offer = JobOffer::<FakeTask>::new(1, bq_core::NodeId::new(1));
    let node: Arc<dyn Node> = Arc::new(FakeNode::new(1, 2).offline());
    let item = item_with_label(None);
    assert!(!offer_can_take(&offer, Some(&node), &item, &[]));
}

#[test]
fn offer_can_take_rejects_label_mismatch() {
    let offer = JobOffer::<FakeTask>::new(1, bq_core::NodeId::new(1));
    let node: Arc<dyn Node> = Arc::new(FakeNode::new(1, 2).with_label("linux"));
    let item = item_with_label(Some("windows"));
    assert!(!offer_can_take(&offer, Some(&node), &item, &[]));
}

#[test]
fn offer_can_take_accepts_matching_offer() {
    let offer = JobOffer::<FakeTask>::new(1, bq_core::NodeId::new(1));
    let node: Arc<dyn Node> = Arc::new(FakeNode::new(1, 2).with_label("linux"));
    let item = item_with_label(Some("linux"));
    assert!(offer_can_take(&offer, Some(&node), &item, &[]));
}

#[test]
fn offer_can_take_rejects_already_assigned_offer() {
    let offer = JobOffer::<FakeTask>::new(1, bq_core::NodeId::new(1));
    offer.set(bq_core::WorkUnit {
        id: bq_core::WorkUnitId::new(1),
        item_id: bq_core::ItemId::new(1),
        task: FakeTask::new("build"),
        node: bq_core::NodeId::new(1),
        is_main: true,
    });
    let node: Arc<dyn Node> = Arc::new(FakeNode::new(1, 2));
    let item = item_with_label(None);
    assert!(!offer_can_take(&offer, Some(&node), &item, &[]));
}

#[test]
fn first_fit_assigns_main_to_first_candidate() {
    let balancer = FirstFitLoadBalancer;
    let candidates = vec![
        CandidateOffer {
            offer_id: 1,
            node_id: bq_core::NodeId::new(1),
        },
        CandidateOffer {
            offer_id: 2,
            node_id: bq_core::NodeId::new(2),
        },
    ];
    let worksheet = MappingWorksheet {
        candidates: &candidates,
    };
    let mapping = balancer
        .map(&FakeTask::new("build"), &worksheet)
        .expect("mapping");
    assert!(mapping.has_main());
    assert_eq!(mapping.assignments[0].offer_id, 1);
}

#[test]
fn first_fit_returns_none_with_no_candidates() {
    let balancer = FirstFitLoadBalancer;
    let worksheet = MappingWorksheet { candidates: &[] };
    assert!(balancer.map(&FakeTask::new("build"), &worksheet).is_none());
}
