// SPDX-License-Identifier: MIT

//! Scheduler-level errors (§7).
//!
//! Admission vetoes, duplicate coalescing, and cancellation are not
//! errors — they're encoded in the return types of `schedule`/`cancel`.
//! This enum covers the faults that are genuinely exceptional: a
//! misconfigured scheduler or a failure surfaced from persistence.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("persistence failure: {0}")]
    Persistence(#[from] bq_storage::PersistenceError),

    #[error("no task named '{0}' could be resolved while loading persisted state")]
    UnresolvedTask(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}
