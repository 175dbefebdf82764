// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors from queue-file persistence operations.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
