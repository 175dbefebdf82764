// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Minimal on-disk layout for crash recovery (§4.9).
//!
//! Persistence format details beyond what's needed for crash recovery are
//! out of scope (§1), so this crate keeps the *semantics* the source
//! describes — ordered record list, legacy-text migration-then-delete,
//! corrupt-entry dropping, `.bak` rotation on load — but serializes with
//! `serde_json` rather than XML (recorded in DESIGN.md). Only task
//! identity, queue stage, and timestamps are persisted; actions are
//! transient per-request metadata and are not expected to survive a
//! restart.

mod error;
mod file;
mod legacy;

pub use error::PersistenceError;
pub use file::{
    load, save, LoadedQueue, PersistedItem, PersistedStage, QueueFile, TaskResolver,
    CURRENT_QUEUE_FILE_VERSION,
};
pub use legacy::parse_legacy_file;
