// SPDX-License-Identifier: MIT

//! The queue file: ordered records of task identity, stage, and timestamps.
//!
//! Actions are not persisted (§1); a restart reconstructs the queue with no
//! actions attached, which only affects label/veto decisions already made
//! before the crash. Tasks are stored by full display name and resolved back
//! to `T` via a [`TaskResolver`] on load; a missing referent drops the entry.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::PersistenceError;

/// Current on-disk schema version. Bump when [`PersistedItem`] changes shape.
pub const CURRENT_QUEUE_FILE_VERSION: u32 = 1;

/// Stage of an item as persisted, matching its concrete type on load
/// (§4.9). Pending items are excluded from the saved set entirely: they
/// are already handed to an executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PersistedStage {
    Waiting { due_at_epoch_ms: u64 },
    Blocked,
    Buildable,
}

/// One queued task as persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedItem {
    pub id: u64,
    pub task_name: String,
    pub in_queue_since_epoch_ms: u64,
    pub stage: PersistedStage,
}

/// The file's top-level shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueFile {
    pub version: u32,
    pub items: Vec<PersistedItem>,
}

impl QueueFile {
    pub fn new(items: Vec<PersistedItem>) -> Self {
        Self {
            version: CURRENT_QUEUE_FILE_VERSION,
            items,
        }
    }
}

/// Resolves a task's full display name back to a live `T` on load.
///
/// Grounded in §4.9: "a missing referent drops the entry" — the scheduler
/// owns the mapping from names to current task definitions (e.g. from its
/// job configuration), not the storage layer.
pub trait TaskResolver<T> {
    fn resolve(&self, full_display_name: &str) -> Option<T>;
}

/// Result of loading a queue file: either the current structured format, or
/// a legacy one-name-per-line file that still needs migrating.
pub enum LoadedQueue {
    Structured(Vec<PersistedItem>),
    Legacy(Vec<String>),
    Missing,
}

/// Path of the legacy one-name-per-line file accepted for migration,
/// sitting alongside the structured queue file.
fn legacy_path(path: &Path) -> PathBuf {
    path.with_extension("txt")
}

/// Load the queue file at `path`.
///
/// A legacy `.txt` sibling, if present, takes priority and is deleted once
/// parsed (one-time migration). Otherwise the structured file is read and,
/// whether or not it parsed cleanly, rotated to a `.bak` sibling so the
/// source file is never left behind for the next load to trip over. A
/// corrupt structured file is treated as missing rather than failing the
/// whole load, mirroring crash-recovery semantics: an unreadable queue file
/// should not block the controller from starting.
pub fn load(path: &Path, max_backup_generations: u32) -> Result<LoadedQueue, PersistenceError> {
    let legacy = legacy_path(path);
    if legacy.exists() {
        let names = crate::legacy::parse_legacy_file(&legacy)?;
        fs::remove_file(&legacy)?;
        return Ok(LoadedQueue::Legacy(names));
    }

    if !path.exists() {
        return Ok(LoadedQueue::Missing);
    }

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    match serde_json::from_reader::<_, QueueFile>(reader) {
        Ok(queue) => {
            let bak_path = rotate_bak_path(path, max_backup_generations.max(1));
            fs::rename(path, &bak_path)?;
            Ok(LoadedQueue::Structured(queue.items))
        }
        Err(e) => {
            let bak_path = rotate_bak_path(path, max_backup_generations.max(1));
            warn!(
                error = %e,
                path = %path.display(),
                bak = %bak_path.display(),
                "corrupt queue file, moving to .bak and starting empty",
            );
            fs::rename(path, &bak_path)?;
            Ok(LoadedQueue::Missing)
        }
    }
}

/// Save the queue file atomically: write to a `.tmp` sibling, fsync, then
/// rename over the destination.
pub fn save(path: &Path, items: &[PersistedItem]) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("tmp");
    {
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &QueueFile::new(items.to_vec()))?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out so at
/// most `max_generations` are ever kept (§10: `SchedulerConfig`'s
/// `max_backup_generations` knob).
fn rotate_bak_path(path: &Path, max_generations: u32) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(max_generations);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }

    for n in (1..max_generations).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }

    bak(1)
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
