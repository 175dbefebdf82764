// SPDX-License-Identifier: MIT

//! The `Node` capability trait — the scheduler's view of an executor host.
//!
//! Node/executor implementations are out of scope (§1); this is just
//! enough surface for the assignment engine (§4.6) and the flyweight fast
//! path (§4.7) to make placement decisions without knowing how a node
//! actually runs work.

use crate::resource::ResourceId;

crate::define_numeric_id! {
    /// Identifier for a node in the fleet.
    pub struct NodeId;
}

/// What a candidate item needs from a node, without exposing the whole
/// task — keeps [`Node`] object-safe (`Arc<dyn Node>`) rather than
/// generic over the scheduler's task type.
#[derive(Debug, Clone, Default)]
pub struct TaskRequirements<'a> {
    pub label: Option<&'a str>,
    pub resources: &'a [ResourceId],
}

/// The scheduler's view of a fleet node.
pub trait Node: Send + Sync + 'static {
    fn id(&self) -> NodeId;

    /// The built-in controller node is always eligible for flyweight
    /// placement even with zero configured executors.
    fn is_master(&self) -> bool {
        false
    }

    fn num_executors(&self) -> u32;

    fn is_online(&self) -> bool;

    fn is_accepting_tasks(&self) -> bool {
        true
    }

    fn has_label(&self, label: &str) -> bool;

    /// `None` if this node can take the item; `Some(reason)` otherwise.
    fn can_take(&self, req: TaskRequirements<'_>) -> Option<String> {
        if let Some(label) = req.label {
            if !label.is_empty() && !self.has_label(label) {
                return Some(format!("node does not match label '{label}'"));
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
