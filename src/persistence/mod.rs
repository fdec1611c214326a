//! JSON snapshot persistence.
//!
//! The only durable state in this system is three flat JSON files under the
//! config directory: `accounts.json`, `inputs.json` and `programState.json`.
//! They are read once at startup to seed the store and overwritten in full,
//! best-effort, after mutations. Persistence is not transactional with the
//! in-memory mutation: a failed write is logged and nothing else.

pub mod snapshot;
pub mod writer;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
