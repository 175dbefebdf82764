// SPDX-License-Identifier: MIT

//! The `Task` capability trait.
//!
//! A task is an opaque unit of work owned by the caller. The scheduler
//! never constructs or mutates one; it only reads the capabilities below
//! to drive admission, blocking, and assignment decisions. Value-equality
//! (`Eq` + `Hash`) is what the quiet-period scheduler uses to detect
//! duplicate submissions (§4.1).

use crate::resource::ResourceId;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;

/// Execution label / affinity tag (e.g. a node label expression). Opaque
/// to the scheduler beyond equality and display.
pub type Label = String;

/// Opaque handle to one of a task's subtasks (multi-part builds such as
/// matrix configurations). The scheduler only needs enough of a subtask
/// to decide whether it needs its own work unit; the subtask's own
/// execution is entirely the caller's concern.
#[derive(Debug, Clone)]
pub struct SubTaskHandle {
    pub display_name: String,
    pub resource_list: Vec<ResourceId>,
}

/// Capability set a caller's task type must implement.
///
/// `T: Task` is the scheduler's only generic bound on the unit of work it
/// manages — there is no `dyn Task`, so equality and hashing come directly
/// from the bound rather than a hand-rolled identity scheme.
pub trait Task: Clone + Eq + Hash + Debug + Send + Sync + 'static {
    /// Human-readable name used as the flyweight consistent-hash key and
    /// in log output.
    fn full_display_name(&self) -> String;

    /// Node label expression this task must run under, if any.
    fn assigned_label(&self) -> Option<Label> {
        None
    }

    /// Resources this task needs exclusive access to while running.
    fn resource_list(&self) -> Vec<ResourceId> {
        Vec::new()
    }

    /// Caller-supplied reason this task cannot run right now, if any.
    /// Distinct from dispatcher-provided blocking (§4.4) — this is the
    /// task's own opinion.
    fn cause_of_blockage(&self) -> Option<String> {
        None
    }

    /// True if the task itself reports being blocked (independent of
    /// resource conflicts and dispatcher vetoes).
    fn is_build_blocked(&self) -> bool {
        false
    }

    /// True if more than one item for this task may be buildable/pending
    /// at once (§4.5).
    fn is_concurrent_build(&self) -> bool {
        false
    }

    /// Additional subtasks dispatched alongside the main work unit.
    fn sub_tasks(&self) -> Vec<SubTaskHandle> {
        Vec::new()
    }

    /// Caller's estimate of how long this task will run, if known.
    fn estimated_duration(&self) -> Option<Duration> {
        None
    }

    /// True if this task's waiting item should survive a `save`/`load`
    /// cycle (§4.9: transient tasks are excluded from persistence).
    fn is_persistent(&self) -> bool {
        true
    }

    /// True if this task is a flyweight (executor-less) task (§4.7).
    fn is_flyweight(&self) -> bool {
        false
    }

    /// True if this task should never participate in resource/dispatcher
    /// blocking (always considered unblocked).
    fn is_non_blocking(&self) -> bool {
        false
    }
}
