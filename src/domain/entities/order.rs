use crate::domain::value_objects::loose_number;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "Buy"),
            OrderSide::Sell => write!(f, "Sell"),
        }
    }
}

impl FromStr for OrderSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Buy" => Ok(OrderSide::Buy),
            "Sell" => Ok(OrderSide::Sell),
            other => Err(format!("invalid side '{}', expected Buy or Sell", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Market,
    Limit,
    Stop,
    StopLimit,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Market => write!(f, "Market"),
            OrderType::Limit => write!(f, "Limit"),
            OrderType::Stop => write!(f, "Stop"),
            OrderType::StopLimit => write!(f, "StopLimit"),
        }
    }
}

impl FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Market" => Ok(OrderType::Market),
            "Limit" => Ok(OrderType::Limit),
            "Stop" => Ok(OrderType::Stop),
            "StopLimit" => Ok(OrderType::StopLimit),
            other => Err(format!(
                "invalid order type '{}', expected Market, Limit, Stop or StopLimit",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Working,
    Filled,
    Cancelled,
    Rejected,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Working => write!(f, "Working"),
            OrderStatus::Filled => write!(f, "Filled"),
            OrderStatus::Cancelled => write!(f, "Cancelled"),
            OrderStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Working" => Ok(OrderStatus::Working),
            "Filled" => Ok(OrderStatus::Filled),
            "Cancelled" => Ok(OrderStatus::Cancelled),
            "Rejected" => Ok(OrderStatus::Rejected),
            other => Err(format!(
                "invalid status '{}', expected Working, Filled, Cancelled or Rejected",
                other
            )),
        }
    }
}

/// A manually-entered order. Display-side quantity and price decode loosely:
/// a viewer may receive them as strings, and sentinels like "All" map to
/// `None` (shown as unknown, not zero).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub account_id: i64,
    pub symbol: String,
    pub side: OrderSide,
    #[serde(default, deserialize_with = "loose_number::option")]
    pub quantity: Option<f64>,
    #[serde(
        default,
        deserialize_with = "loose_number::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub quantity_left: Option<f64>,
    #[serde(default, deserialize_with = "loose_number::option")]
    pub price: Option<f64>,
    pub order_type: OrderType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Human-readable one-liner used for the synthesized log entries,
    /// e.g. "Buy 1 ES @ 4300".
    pub fn placement_summary(&self) -> String {
        let quantity = match self.quantity {
            Some(q) => format!("{}", q),
            None => "All".to_string(),
        };
        let price = match self.price {
            Some(p) => format!("{}", p),
            None => "Market".to_string(),
        };
        format!("{} {} {} @ {}", self.side, quantity, self.symbol, price)
    }
}
