use crate::domain::entities::Account;
use crate::persistence::SnapshotError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, error, info};

pub const ACCOUNTS_FILE: &str = "accounts.json";
pub const INPUTS_FILE: &str = "inputs.json";
pub const PROGRAM_STATE_FILE: &str = "programState.json";

/// Contents of `inputs.json`: the merged settings object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsSnapshot {
    pub global: Option<serde_json::Value>,
    pub daily: Option<serde_json::Value>,
}

/// Contents of `programState.json`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramStateSnapshot {
    pub running: bool,
}

/// Everything the snapshot files contribute to the store at startup.
#[derive(Debug, Default)]
pub struct SeedData {
    pub accounts: Vec<Account>,
    pub settings: SettingsSnapshot,
    pub program_state: Option<ProgramStateSnapshot>,
}

/// Load all snapshot files. A missing file is normal (first run); a file
/// that exists but does not parse is logged and its seed skipped.
pub async fn load(dir: &Path) -> SeedData {
    SeedData {
        accounts: read_json(&dir.join(ACCOUNTS_FILE)).await.unwrap_or_default(),
        settings: read_json(&dir.join(INPUTS_FILE)).await.unwrap_or_default(),
        program_state: read_json(&dir.join(PROGRAM_STATE_FILE)).await,
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(_) => {
            debug!("no snapshot at {}", path.display());
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => {
            info!("loaded snapshot {}", path.display());
            Some(value)
        }
        Err(e) => {
            error!("snapshot {} is unreadable, skipping: {}", path.display(), e);
            None
        }
    }
}

/// Full overwrite of one snapshot file, creating the directory on first use.
pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), SnapshotError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let bytes = serde_json::to_vec_pretty(value)?;
    tokio::fs::write(path, bytes).await?;
    Ok(())
}
