//! Request validation for the mutation API.
//!
//! Payload structs accept everything optional, then `into_*` collects every
//! field violation at once so the caller sees the full list, not just the
//! first failure. Nothing touches the store until validation passes.

use crate::application::store::{AccountPatch, NewAccount, NewOrder, OrderPatch};
use crate::domain::entities::{LogLevel, OrderSide, OrderStatus, OrderType, SettingType};
use crate::domain::errors::{ApiError, FieldViolation};
use crate::domain::value_objects::loose_number;
use serde::Deserialize;
use std::str::FromStr;

fn require_text(
    violations: &mut Vec<FieldViolation>,
    field: &str,
    value: Option<String>,
) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        Some(_) => {
            violations.push(FieldViolation::new(field, "must not be empty"));
            String::new()
        }
        None => {
            violations.push(FieldViolation::new(field, "is required"));
            String::new()
        }
    }
}

fn parse_domain<T>(
    violations: &mut Vec<FieldViolation>,
    field: &str,
    value: &str,
) -> Option<T>
where
    T: FromStr<Err = String>,
{
    match value.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(message) => {
            violations.push(FieldViolation::new(field, message));
            None
        }
    }
}

fn check(violations: Vec<FieldViolation>) -> Result<(), ApiError> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation(violations))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPayload {
    pub name: Option<String>,
    pub broker: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub account_number: Option<String>,
    pub refresh_token: Option<String>,
    pub percent_to_trade: Option<f64>,
    pub active: Option<bool>,
}

impl AccountPayload {
    pub fn into_new(self) -> Result<NewAccount, ApiError> {
        let mut violations = Vec::new();
        let name = require_text(&mut violations, "name", self.name);
        let broker = require_text(&mut violations, "broker", self.broker);
        let api_key = require_text(&mut violations, "apiKey", self.api_key);
        let api_secret = require_text(&mut violations, "apiSecret", self.api_secret);
        let percent_to_trade = self.percent_to_trade.unwrap_or(1.0);
        if !(0.0..=1.0).contains(&percent_to_trade) {
            violations.push(FieldViolation::new(
                "percentToTrade",
                "must be between 0 and 1",
            ));
        }
        check(violations)?;
        Ok(NewAccount {
            name,
            broker,
            api_key,
            api_secret,
            account_number: self.account_number,
            refresh_token: self.refresh_token,
            percent_to_trade,
            active: self.active.unwrap_or(true),
        })
    }

    pub fn into_patch(self) -> Result<AccountPatch, ApiError> {
        let mut violations = Vec::new();
        for (field, value) in [
            ("name", &self.name),
            ("broker", &self.broker),
            ("apiKey", &self.api_key),
            ("apiSecret", &self.api_secret),
        ] {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                violations.push(FieldViolation::new(field, "must not be empty"));
            }
        }
        if let Some(percent) = self.percent_to_trade {
            if !(0.0..=1.0).contains(&percent) {
                violations.push(FieldViolation::new(
                    "percentToTrade",
                    "must be between 0 and 1",
                ));
            }
        }
        check(violations)?;
        Ok(AccountPatch {
            name: self.name,
            broker: self.broker,
            api_key: self.api_key,
            api_secret: self.api_secret,
            account_number: self.account_number,
            refresh_token: self.refresh_token,
            percent_to_trade: self.percent_to_trade,
            active: self.active,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub account_id: Option<i64>,
    pub symbol: Option<String>,
    pub side: Option<String>,
    #[serde(default, deserialize_with = "loose_number::option")]
    pub quantity: Option<f64>,
    #[serde(default, deserialize_with = "loose_number::option")]
    pub quantity_left: Option<f64>,
    #[serde(default, deserialize_with = "loose_number::option")]
    pub price: Option<f64>,
    pub order_type: Option<String>,
    pub time_in_force: Option<String>,
    pub status: Option<String>,
}

impl OrderPayload {
    pub fn into_new(self) -> Result<NewOrder, ApiError> {
        let mut violations = Vec::new();
        let account_id = match self.account_id {
            Some(id) => id,
            None => {
                violations.push(FieldViolation::new("accountId", "is required"));
                0
            }
        };
        let symbol = require_text(&mut violations, "symbol", self.symbol);
        let side = match &self.side {
            Some(raw) => parse_domain::<OrderSide>(&mut violations, "side", raw),
            None => {
                violations.push(FieldViolation::new("side", "is required"));
                None
            }
        };
        let quantity = match self.quantity {
            Some(q) if q > 0.0 => Some(q),
            Some(_) => {
                violations.push(FieldViolation::new("quantity", "must be a positive number"));
                None
            }
            None => {
                violations.push(FieldViolation::new("quantity", "must be a positive number"));
                None
            }
        };
        let order_type = match &self.order_type {
            Some(raw) => parse_domain::<OrderType>(&mut violations, "orderType", raw),
            None => {
                violations.push(FieldViolation::new("orderType", "is required"));
                None
            }
        };
        if let Some(price) = self.price {
            if price <= 0.0 {
                violations.push(FieldViolation::new("price", "must be a positive number"));
            }
        } else if matches!(order_type, Some(OrderType::Limit) | Some(OrderType::StopLimit)) {
            violations.push(FieldViolation::new("price", "is required for limit orders"));
        }
        let status = match &self.status {
            Some(raw) => parse_domain::<OrderStatus>(&mut violations, "status", raw),
            None => Some(OrderStatus::Working),
        };
        check(violations)?;
        Ok(NewOrder {
            account_id,
            symbol,
            side: side.expect("validated"),
            quantity: quantity.expect("validated"),
            price: self.price,
            order_type: order_type.expect("validated"),
            time_in_force: self.time_in_force,
            status: status.expect("validated"),
        })
    }

    pub fn into_patch(self) -> Result<OrderPatch, ApiError> {
        let mut violations = Vec::new();
        if matches!(&self.symbol, Some(s) if s.trim().is_empty()) {
            violations.push(FieldViolation::new("symbol", "must not be empty"));
        }
        let side = match &self.side {
            Some(raw) => parse_domain::<OrderSide>(&mut violations, "side", raw),
            None => None,
        };
        let order_type = match &self.order_type {
            Some(raw) => parse_domain::<OrderType>(&mut violations, "orderType", raw),
            None => None,
        };
        let status = match &self.status {
            Some(raw) => parse_domain::<OrderStatus>(&mut violations, "status", raw),
            None => None,
        };
        for (field, value) in [("quantity", self.quantity), ("price", self.price)] {
            if matches!(value, Some(v) if v <= 0.0) {
                violations.push(FieldViolation::new(field, "must be a positive number"));
            }
        }
        check(violations)?;
        Ok(OrderPatch {
            account_id: self.account_id,
            symbol: self.symbol,
            side,
            quantity: self.quantity,
            quantity_left: self.quantity_left,
            price: self.price,
            order_type,
            time_in_force: self.time_in_force,
            status,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogPayload {
    pub level: Option<String>,
    pub message: Option<String>,
}

impl LogPayload {
    pub fn into_new(self) -> Result<(LogLevel, String), ApiError> {
        let mut violations = Vec::new();
        let level = match &self.level {
            Some(raw) => parse_domain::<LogLevel>(&mut violations, "level", raw),
            None => {
                violations.push(FieldViolation::new("level", "is required"));
                None
            }
        };
        let message = require_text(&mut violations, "message", self.message);
        check(violations)?;
        Ok((level.expect("validated"), message))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingPayload {
    #[serde(rename = "type")]
    pub setting_type: Option<String>,
    pub data: Option<serde_json::Value>,
}

impl SettingPayload {
    /// The path segment is authoritative; a body `type` is accepted only
    /// when it agrees.
    pub fn into_data(self, path_type: SettingType) -> Result<serde_json::Value, ApiError> {
        let mut violations = Vec::new();
        if let Some(body_type) = &self.setting_type {
            if *body_type != path_type.to_string() {
                violations.push(FieldViolation::new("type", "does not match the request path"));
            }
        }
        let data = match self.data {
            Some(data) => data,
            None => {
                violations.push(FieldViolation::new("data", "is required"));
                serde_json::Value::Null
            }
        };
        check(violations)?;
        Ok(data)
    }
}

/// Parse the `:type` path segment of the settings routes.
pub fn parse_setting_type(raw: &str) -> Result<SettingType, ApiError> {
    raw.parse::<SettingType>()
        .map_err(|message| ApiError::validation(vec![FieldViolation::new("type", message)]))
}
