// SPDX-License-Identifier: MIT

//! The assignment engine: `JobOffer.canTake` (§4.6), the `LoadBalancer`
//! extension point, and a default first-fit strategy.

use std::sync::Arc;

use bq_core::{resolve_label, Item, Node, NodeId, Task, TaskRequirements};

use crate::decision::{isolate_dispatcher_call, QueueTaskDispatcher};
use crate::job_offer::JobOffer;

/// The task's effective label: a `LabelAssignmentAction` override if any
/// action on the item supplies one, else the task's own default (§3,
/// §9's tie-breaking decision — first action wins).
pub fn effective_label<T: Task>(item: &Item<T>) -> Option<String> {
    resolve_label(item.task(), &item.core().actions, item.task().assigned_label())
}

/// `offer.canTake(item)` (§4.6): the node exists, is online and
/// accepting tasks, its own `can_take` approves, no dispatcher vetoes,
/// and the offer isn't already assigned.
pub fn offer_can_take<T: Task>(
    offer: &JobOffer<T>,
    node: Option<&Arc<dyn Node>>,
    item: &Item<T>,
    dispatchers: &[Arc<dyn QueueTaskDispatcher<T>>],
) -> bool {
    if offer.is_assigned() {
        return false;
    }
    let Some(node) = node else {
        return false;
    };
    if !node.is_online() || !node.is_accepting_tasks() {
        return false;
    }
    let label = effective_label(item);
    let req = TaskRequirements {
        label: label.as_deref(),
        resources: &item.task().resource_list(),
    };
    if node.can_take(req).is_some() {
        return false;
    }
    !dispatchers.iter().any(|d| {
        isolate_dispatcher_call(
            "can_take",
            std::panic::AssertUnwindSafe(|| d.can_take(node.as_ref(), item)),
        )
        .is_some()
    })
}

/// One parked offer found eligible for a buildable item (§4.3 Phase C
/// step 2).
#[derive(Debug, Clone, Copy)]
pub struct CandidateOffer {
    pub offer_id: u64,
    pub node_id: NodeId,
}

/// What a [`LoadBalancer`] is asked to place (§4.3 Phase C step 3).
pub struct MappingWorksheet<'a> {
    pub candidates: &'a [CandidateOffer],
}

/// One work unit placement a [`Mapping`] produces.
#[derive(Debug, Clone, Copy)]
pub struct MappingAssignment {
    pub offer_id: u64,
    pub node_id: NodeId,
    pub is_main: bool,
}

/// The result of `LoadBalancer::map`: zero or more placements for the
/// item's main work unit and any subtasks.
#[derive(Debug, Clone, Default)]
pub struct Mapping {
    pub assignments: Vec<MappingAssignment>,
}

impl Mapping {
    pub fn has_main(&self) -> bool {
        self.assignments.iter().any(|a| a.is_main)
    }
}

/// Strategy that maps a buildable item plus candidate offers to an
/// actual executor assignment (§6: `loadBalancer`).
pub trait LoadBalancer<T: Task>: Send + Sync {
    fn map(&self, task: &T, worksheet: &MappingWorksheet<'_>) -> Option<Mapping>;
}

/// Default load balancer: assigns the main work unit to the first
/// candidate, then one subtask per remaining candidate in order. Leaves
/// excess subtasks undispatched rather than failing the whole mapping —
/// only the main unit is required for the item to leave buildable.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstFitLoadBalancer;

impl<T: Task> LoadBalancer<T> for FirstFitLoadBalancer {
    fn map(&self, task: &T, worksheet: &MappingWorksheet<'_>) -> Option<Mapping> {
        let (main, rest) = worksheet.candidates.split_first()?;
        let mut assignments = vec![MappingAssignment {
            offer_id: main.offer_id,
            node_id: main.node_id,
            is_main: true,
        }];
        for (sub_task, candidate) in task.sub_tasks().iter().zip(rest) {
            let _ = sub_task;
            assignments.push(MappingAssignment {
                offer_id: candidate.offer_id,
                node_id: candidate.node_id,
                is_main: false,
            });
        }
        Some(Mapping { assignments })
    }
}

#[cfg(test)]
#[path = "assignment_tests.rs"]
mod tests;
