use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Singleton on/off flag for the (external) trading program.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramState {
    pub id: i64,
    pub running: bool,
    pub updated_at: DateTime<Utc>,
}
