use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest-trade quote for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteData {
    pub id: i64,
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub timestamp: DateTime<Utc>,
}
