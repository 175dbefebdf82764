// SPDX-License-Identifier: MIT

//! Typed, file-backed scheduler knobs (§2, §10).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::SchedulerError;

/// Configuration for one [`crate::Scheduler`] instance.
///
/// Loadable from a TOML file via [`SchedulerConfig::load`]; falls back to
/// [`Default`] for any field a config file omits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Quiet period applied when a caller doesn't specify one explicitly.
    #[serde(with = "duration_secs")]
    pub default_quiet_period: Duration,
    /// How often the periodic liveness-backstop timer calls `maintain()`.
    #[serde(with = "duration_secs")]
    pub maintenance_tick_interval: Duration,
    /// Bound on how stale `approximate_items()` is allowed to read (§4.10).
    #[serde(with = "duration_secs")]
    pub snapshot_staleness_window: Duration,
    /// Where the queue file is persisted.
    pub persistence_path: PathBuf,
    /// Max `.bak` generations kept on corrupt/legacy load.
    pub max_backup_generations: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            default_quiet_period: Duration::from_secs(5),
            maintenance_tick_interval: Duration::from_secs(5),
            snapshot_staleness_window: Duration::from_secs(1),
            persistence_path: PathBuf::from("queue.json"),
            max_backup_generations: 3,
        }
    }
}

impl SchedulerConfig {
    /// Load from a TOML file, falling back to defaults for omitted fields.
    pub fn load(path: &Path) -> Result<Self, SchedulerError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SchedulerError::Config(format!("reading {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| SchedulerError::Config(format!("parsing {}: {e}", path.display())))
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
