use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health row shown on the dashboard. These are static demo rows; there is
/// no real health-check behind them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub id: i64,
    pub name: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub updated_at: DateTime<Utc>,
}
