use serde::{Deserialize, Serialize};

/// A broker account usable for order entry.
///
/// Credentials are held as-is; there is no encryption layer in this system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub broker: String,
    pub api_key: String,
    pub api_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Fraction of account size committed per trade, 0.0..=1.0.
    pub percent_to_trade: f64,
    pub active: bool,
}
