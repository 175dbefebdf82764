// SPDX-License-Identifier: MIT

//! Fake `Task`/`Node` implementations shared by this crate's and other
//! crates' tests. Only compiled with `--features test-support`.

use crate::node::{Node, NodeId, TaskRequirements};
use crate::resource::ResourceId;
use crate::task::{Label, Task};
use std::time::Duration;

/// Minimal in-memory task for tests: a name plus the handful of flags the
/// scheduler branches on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FakeTask {
    pub name: String,
    pub label: Option<Label>,
    pub resources: Vec<ResourceId>,
    pub concurrent: bool,
    pub flyweight: bool,
    pub blocked: bool,
    pub persistent: bool,
    pub non_blocking: bool,
}

impl FakeTask {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            resources: Vec::new(),
            concurrent: false,
            flyweight: false,
            blocked: false,
            persistent: true,
            non_blocking: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_resources(mut self, resources: Vec<ResourceId>) -> Self {
        self.resources = resources;
        self
    }

    pub fn concurrent(mut self) -> Self {
        self.concurrent = true;
        self
    }

    pub fn flyweight(mut self) -> Self {
        self.flyweight = true;
        self
    }

    pub fn blocked(mut self) -> Self {
        self.blocked = true;
        self
    }

    pub fn non_blocking(mut self) -> Self {
        self.non_blocking = true;
        self
    }

    pub fn transient(mut self) -> Self {
        self.persistent = false;
        self
    }
}

impl Task for FakeTask {
    fn full_display_name(&self) -> String {
        self.name.clone()
    }

    fn assigned_label(&self) -> Option<Label> {
        self.label.clone()
    }

    fn resource_list(&self) -> Vec<ResourceId> {
        self.resources.clone()
    }

    fn is_build_blocked(&self) -> bool {
        self.blocked
    }

    fn is_concurrent_build(&self) -> bool {
        self.concurrent
    }

    fn estimated_duration(&self) -> Option<Duration> {
        None
    }

    fn is_persistent(&self) -> bool {
        self.persistent
    }

    fn is_flyweight(&self) -> bool {
        self.flyweight
    }

    fn is_non_blocking(&self) -> bool {
        self.non_blocking
    }
}

/// Minimal in-memory node for tests.
#[derive(Debug, Clone)]
pub struct FakeNode {
    pub id: NodeId,
    pub master: bool,
    pub executors: u32,
    pub online: bool,
    pub accepting: bool,
    pub labels: Vec<String>,
}

impl FakeNode {
    pub fn new(id: u64, executors: u32) -> Self {
        Self {
            id: NodeId::new(id),
            master: false,
            executors,
            online: true,
            accepting: true,
            labels: Vec::new(),
        }
    }

    pub fn master(mut self) -> Self {
        self.master = true;
        self
    }

    pub fn offline(mut self) -> Self {
        self.online = false;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }
}

impl Node for FakeNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn is_master(&self) -> bool {
        self.master
    }

    fn num_executors(&self) -> u32 {
        self.executors
    }

    fn is_online(&self) -> bool {
        self.online
    }

    fn is_accepting_tasks(&self) -> bool {
        self.accepting
    }

    fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    fn can_take(&self, req: TaskRequirements<'_>) -> Option<String> {
        if let Some(label) = req.label {
            if !label.is_empty() && !self.has_label(label) {
                return Some(format!("node {} does not match label '{label}'", self.id));
            }
        }
        None
    }
}
