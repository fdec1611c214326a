use crate::domain::value_objects::loose_number;
use serde::{Deserialize, Serialize};

/// Display-only snapshot of an open position. Positions carry no lifecycle
/// of their own here: the whole collection is replaced on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: i64,
    pub account_id: i64,
    pub symbol: String,
    #[serde(default, deserialize_with = "loose_number::option")]
    pub quantity: Option<f64>,
    #[serde(default, deserialize_with = "loose_number::option")]
    pub avg_price: Option<f64>,
    #[serde(default, deserialize_with = "loose_number::option")]
    pub pnl: Option<f64>,
}
