// SPDX-License-Identifier: MIT

//! Legacy `queue.txt` migration: one task full-name per line (§4.9).

use std::path::Path;

use crate::error::PersistenceError;

/// Parse a legacy one-task-name-per-line file. Blank lines are skipped.
pub fn parse_legacy_file(path: &Path) -> Result<Vec<String>, PersistenceError> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
#[path = "legacy_tests.rs"]
mod tests;
