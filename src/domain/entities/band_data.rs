use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One point of the premium-versus-bands series. Values are computed by an
/// external system (or simulated); this service only stores and fans them
/// out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandData {
    pub id: i64,
    pub premium: f64,
    pub upper_band: f64,
    pub lower_band: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m1_close: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bollinger_upper_band: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bollinger_lower_band: Option<f64>,
    pub timestamp: DateTime<Utc>,
}
