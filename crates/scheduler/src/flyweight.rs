// SPDX-License-Identifier: MIT

//! Flyweight fast path (§4.7): sticky consistent-hash placement for
//! executor-less tasks, bypassing the normal buildable → assignment
//! pipeline entirely when a node accepts the task directly.

use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use bq_core::{Node, NodeId, TaskRequirements};

/// A consistent-hash ring over the current node set, weighted by
/// `max(num_executors, 1) * 100` (§4.7 step 1). Sticky: the ring only
/// changes shape when the node set changes, so repeated lookups for the
/// same key land on the same node until then.
#[derive(Clone)]
pub struct HashRing {
    ring: BTreeMap<u64, NodeId>,
}

impl HashRing {
    pub fn build(nodes: &[Arc<dyn Node>]) -> Self {
        let mut ring = BTreeMap::new();
        for node in nodes {
            let weight = (node.num_executors().max(1) as u64) * 100;
            for replica in 0..weight {
                let h = hash_key(&format!("{}-{replica}", node.id().get()));
                ring.insert(h, node.id());
            }
        }
        Self { ring }
    }

    /// Walk the ring starting at `key`'s hash, yielding each distinct node
    /// at most once, wrapping around to the start (§4.7 step 2).
    pub fn candidates(&self, key: &str) -> Vec<NodeId> {
        if self.ring.is_empty() {
            return Vec::new();
        }
        let start = hash_key(key);
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for (_, id) in self.ring.range(start..).chain(self.ring.iter()) {
            if seen.insert(*id) {
                out.push(*id);
            }
        }
        out
    }
}

fn hash_key(s: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    s.hash(&mut hasher);
    hasher.finish()
}

/// Find the first ring candidate that can actually take the item (§4.7
/// steps 3-4): online, accepting tasks, label-compatible, and passing
/// `Node::can_take`.
pub fn pick_flyweight_node(
    ring: &HashRing,
    key: &str,
    req: TaskRequirements<'_>,
    nodes: &[Arc<dyn Node>],
) -> Option<NodeId> {
    for node_id in ring.candidates(key) {
        let Some(node) = nodes.iter().find(|n| n.id() == node_id) else {
            continue;
        };
        if !node.is_online() || !node.is_accepting_tasks() {
            continue;
        }
        if node.can_take(TaskRequirements {
            label: req.label,
            resources: req.resources,
        })
        .is_some()
        {
            continue;
        }
        return Some(node_id);
    }
    None
}

#[cfg(test)]
#[path = "flyweight_tests.rs"]
mod tests;
