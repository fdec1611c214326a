//! In-memory state store.
//!
//! Single authoritative holder of every dashboard collection. The store is
//! an explicit owned object injected into handlers, not a module global,
//! so tests get isolated instances. All mutations run under one write
//! lock, so they never interleave mid-operation.
//!
//! No validation happens here; "not found" is `None`/`false`, never an
//! error. Order mutations synthesize activity-log entries as an observable
//! side effect.

use crate::domain::entities::{
    Account, BandData, LogEntry, LogLevel, Order, OrderSide, OrderStatus, OrderType, Position,
    ProgramState, QuoteData, ServiceStatus, Setting, SettingType,
};
use crate::persistence::snapshot::SettingsSnapshot;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;

/// Bounded histories (logs, band data, quotes per symbol) keep only the
/// most recent entries; the oldest are evicted first.
pub const HISTORY_CAP: usize = 1000;

/// Rows returned by history reads when the caller gives no limit.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub broker: String,
    pub api_key: String,
    pub api_secret: String,
    pub account_number: Option<String>,
    pub refresh_token: Option<String>,
    pub percent_to_trade: f64,
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub broker: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub account_number: Option<String>,
    pub refresh_token: Option<String>,
    pub percent_to_trade: Option<f64>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub account_id: i64,
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: f64,
    pub price: Option<f64>,
    pub order_type: OrderType,
    pub time_in_force: Option<String>,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    pub account_id: Option<i64>,
    pub symbol: Option<String>,
    pub side: Option<OrderSide>,
    pub quantity: Option<f64>,
    pub quantity_left: Option<f64>,
    pub price: Option<f64>,
    pub order_type: Option<OrderType>,
    pub time_in_force: Option<String>,
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Clone)]
pub struct NewPosition {
    pub account_id: i64,
    pub symbol: String,
    pub quantity: Option<f64>,
    pub avg_price: Option<f64>,
    pub pnl: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct NewServiceStatus {
    pub name: String,
    pub status: String,
    pub details: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewBand {
    pub premium: f64,
    pub upper_band: f64,
    pub lower_band: f64,
    pub m1_close: Option<f64>,
    pub bollinger_upper_band: Option<f64>,
    pub bollinger_lower_band: Option<f64>,
}

/// Last-used id per collection; ids are monotonic within one process
/// lifetime and reset on restart.
#[derive(Debug, Default)]
struct IdCounters {
    account: i64,
    order: i64,
    position: i64,
    log: i64,
    setting: i64,
    service_status: i64,
    band: i64,
    quote: i64,
}

fn next(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

#[derive(Debug, Default)]
struct Collections {
    accounts: Vec<Account>,
    orders: Vec<Order>,
    positions: Vec<Position>,
    logs: VecDeque<LogEntry>,
    settings: Vec<Setting>,
    service_statuses: Vec<ServiceStatus>,
    program_state: Option<ProgramState>,
    band_history: VecDeque<BandData>,
    quote_history: HashMap<String, VecDeque<QuoteData>>,
    ids: IdCounters,
}

impl Collections {
    fn push_log(&mut self, level: LogLevel, message: String) -> LogEntry {
        let entry = LogEntry {
            id: next(&mut self.ids.log),
            timestamp: Utc::now(),
            level,
            message,
        };
        self.logs.push_back(entry.clone());
        while self.logs.len() > HISTORY_CAP {
            self.logs.pop_front();
        }
        entry
    }
}

/// Keep the most recent `limit` entries, oldest first.
fn tail<T: Clone>(items: &VecDeque<T>, limit: usize) -> Vec<T> {
    items
        .iter()
        .skip(items.len().saturating_sub(limit))
        .cloned()
        .collect()
}

pub struct Store {
    inner: RwLock<Collections>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Store {
            inner: RwLock::new(Collections::default()),
        }
    }

    // --- accounts ---

    pub async fn list_accounts(&self) -> Vec<Account> {
        self.inner.read().await.accounts.clone()
    }

    pub async fn get_account(&self, id: i64) -> Option<Account> {
        self.inner
            .read()
            .await
            .accounts
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }

    pub async fn create_account(&self, input: NewAccount) -> Account {
        let mut inner = self.inner.write().await;
        let account = Account {
            id: next(&mut inner.ids.account),
            name: input.name,
            broker: input.broker,
            api_key: input.api_key,
            api_secret: input.api_secret,
            account_number: input.account_number,
            refresh_token: input.refresh_token,
            percent_to_trade: input.percent_to_trade,
            active: input.active,
        };
        inner.accounts.push(account.clone());
        account
    }

    pub async fn update_account(&self, id: i64, patch: AccountPatch) -> Option<Account> {
        let mut inner = self.inner.write().await;
        let account = inner.accounts.iter_mut().find(|a| a.id == id)?;
        if let Some(name) = patch.name {
            account.name = name;
        }
        if let Some(broker) = patch.broker {
            account.broker = broker;
        }
        if let Some(api_key) = patch.api_key {
            account.api_key = api_key;
        }
        if let Some(api_secret) = patch.api_secret {
            account.api_secret = api_secret;
        }
        if let Some(account_number) = patch.account_number {
            account.account_number = Some(account_number);
        }
        if let Some(refresh_token) = patch.refresh_token {
            account.refresh_token = Some(refresh_token);
        }
        if let Some(percent_to_trade) = patch.percent_to_trade {
            account.percent_to_trade = percent_to_trade;
        }
        if let Some(active) = patch.active {
            account.active = active;
        }
        Some(account.clone())
    }

    pub async fn delete_account(&self, id: i64) -> bool {
        let mut inner = self.inner.write().await;
        let before = inner.accounts.len();
        inner.accounts.retain(|a| a.id != id);
        inner.accounts.len() != before
    }

    /// Seed accounts loaded from a snapshot file, continuing the id
    /// sequence after the highest seeded id.
    pub async fn seed_accounts(&self, accounts: Vec<Account>) {
        let mut inner = self.inner.write().await;
        inner.ids.account = accounts.iter().map(|a| a.id).max().unwrap_or(0);
        inner.accounts = accounts;
    }

    // --- orders ---

    pub async fn list_orders(&self, account_id: Option<i64>) -> Vec<Order> {
        let inner = self.inner.read().await;
        inner
            .orders
            .iter()
            .filter(|o| account_id.map_or(true, |id| o.account_id == id))
            .cloned()
            .collect()
    }

    pub async fn get_order(&self, id: i64) -> Option<Order> {
        self.inner
            .read()
            .await
            .orders
            .iter()
            .find(|o| o.id == id)
            .cloned()
    }

    /// Create an order and synthesize the matching activity-log entry.
    pub async fn create_order(&self, input: NewOrder) -> (Order, LogEntry) {
        let mut inner = self.inner.write().await;
        let order = Order {
            id: next(&mut inner.ids.order),
            account_id: input.account_id,
            symbol: input.symbol,
            side: input.side,
            quantity: Some(input.quantity),
            quantity_left: Some(input.quantity),
            price: input.price,
            order_type: input.order_type,
            time_in_force: input.time_in_force,
            status: input.status,
            created_at: Utc::now(),
        };
        inner.orders.push(order.clone());
        let log = inner.push_log(
            LogLevel::Info,
            format!("Order placed: {}", order.placement_summary()),
        );
        (order, log)
    }

    pub async fn update_order(&self, id: i64, patch: OrderPatch) -> Option<(Order, LogEntry)> {
        let mut inner = self.inner.write().await;
        let order = inner.orders.iter_mut().find(|o| o.id == id)?;
        if let Some(account_id) = patch.account_id {
            order.account_id = account_id;
        }
        if let Some(symbol) = patch.symbol {
            order.symbol = symbol;
        }
        if let Some(side) = patch.side {
            order.side = side;
        }
        if let Some(quantity) = patch.quantity {
            order.quantity = Some(quantity);
        }
        if let Some(quantity_left) = patch.quantity_left {
            order.quantity_left = Some(quantity_left);
        }
        if let Some(price) = patch.price {
            order.price = Some(price);
        }
        if let Some(order_type) = patch.order_type {
            order.order_type = order_type;
        }
        if let Some(time_in_force) = patch.time_in_force {
            order.time_in_force = Some(time_in_force);
        }
        if let Some(status) = patch.status {
            order.status = status;
        }
        let updated = order.clone();
        let log = inner.push_log(
            LogLevel::Info,
            format!("Order {} updated: {}", updated.id, updated.status),
        );
        Some((updated, log))
    }

    pub async fn delete_order(&self, id: i64) -> Option<LogEntry> {
        let mut inner = self.inner.write().await;
        let index = inner.orders.iter().position(|o| o.id == id)?;
        let order = inner.orders.remove(index);
        let log = inner.push_log(
            LogLevel::Info,
            format!("Order deleted: {}", order.placement_summary()),
        );
        Some(log)
    }

    // --- positions ---

    pub async fn list_positions(&self, account_id: Option<i64>) -> Vec<Position> {
        let inner = self.inner.read().await;
        inner
            .positions
            .iter()
            .filter(|p| account_id.map_or(true, |id| p.account_id == id))
            .cloned()
            .collect()
    }

    /// Positions have no lifecycle here; the collection is replaced
    /// wholesale on every update.
    pub async fn replace_positions(&self, rows: Vec<NewPosition>) -> Vec<Position> {
        let mut inner = self.inner.write().await;
        let positions: Vec<Position> = rows
            .into_iter()
            .map(|row| Position {
                id: next(&mut inner.ids.position),
                account_id: row.account_id,
                symbol: row.symbol,
                quantity: row.quantity,
                avg_price: row.avg_price,
                pnl: row.pnl,
            })
            .collect();
        inner.positions = positions.clone();
        positions
    }

    // --- logs ---

    pub async fn list_logs(&self, limit: Option<usize>) -> Vec<LogEntry> {
        let inner = self.inner.read().await;
        tail(&inner.logs, limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
    }

    pub async fn append_log(&self, level: LogLevel, message: impl Into<String>) -> LogEntry {
        let mut inner = self.inner.write().await;
        inner.push_log(level, message.into())
    }

    // --- settings ---

    pub async fn setting(&self, setting_type: SettingType) -> Option<Setting> {
        self.inner
            .read()
            .await
            .settings
            .iter()
            .find(|s| s.setting_type == setting_type)
            .cloned()
    }

    /// Upsert: one row per type, id stable across overwrites.
    pub async fn upsert_setting(
        &self,
        setting_type: SettingType,
        data: serde_json::Value,
    ) -> Setting {
        let mut inner = self.inner.write().await;
        if let Some(existing) = inner
            .settings
            .iter_mut()
            .find(|s| s.setting_type == setting_type)
        {
            existing.data = data;
            return existing.clone();
        }
        let setting = Setting {
            id: next(&mut inner.ids.setting),
            setting_type,
            data,
        };
        inner.settings.push(setting.clone());
        setting
    }

    /// The merged `{global, daily}` object written to the inputs snapshot.
    pub async fn settings_snapshot(&self) -> SettingsSnapshot {
        let inner = self.inner.read().await;
        let find = |t: SettingType| {
            inner
                .settings
                .iter()
                .find(|s| s.setting_type == t)
                .map(|s| s.data.clone())
        };
        SettingsSnapshot {
            global: find(SettingType::Global),
            daily: find(SettingType::Daily),
        }
    }

    pub async fn seed_settings(&self, snapshot: SettingsSnapshot) {
        if let Some(global) = snapshot.global {
            self.upsert_setting(SettingType::Global, global).await;
        }
        if let Some(daily) = snapshot.daily {
            self.upsert_setting(SettingType::Daily, daily).await;
        }
    }

    // --- service status ---

    pub async fn list_service_statuses(&self) -> Vec<ServiceStatus> {
        self.inner.read().await.service_statuses.clone()
    }

    pub async fn replace_service_statuses(
        &self,
        rows: Vec<NewServiceStatus>,
    ) -> Vec<ServiceStatus> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();
        let statuses: Vec<ServiceStatus> = rows
            .into_iter()
            .map(|row| ServiceStatus {
                id: next(&mut inner.ids.service_status),
                name: row.name,
                status: row.status,
                details: row.details,
                updated_at: now,
            })
            .collect();
        inner.service_statuses = statuses.clone();
        statuses
    }

    // --- program state ---

    pub async fn program_state(&self) -> Option<ProgramState> {
        self.inner.read().await.program_state
    }

    pub async fn seed_program_state(&self, running: bool) {
        let mut inner = self.inner.write().await;
        inner.program_state = Some(ProgramState {
            id: 1,
            running,
            updated_at: Utc::now(),
        });
    }

    /// Flip `running`, refresh the timestamp, and log the transition.
    pub async fn toggle_program_state(&self) -> (ProgramState, LogEntry) {
        let mut inner = self.inner.write().await;
        let running = !inner.program_state.map_or(false, |s| s.running);
        let state = ProgramState {
            id: 1,
            running,
            updated_at: Utc::now(),
        };
        inner.program_state = Some(state);
        let message = if running { "Program started" } else { "Program stopped" };
        let log = inner.push_log(LogLevel::Info, message.to_string());
        (state, log)
    }

    // --- band data ---

    pub async fn latest_band(&self) -> Option<BandData> {
        self.inner.read().await.band_history.back().cloned()
    }

    pub async fn band_history(&self, limit: Option<usize>) -> Vec<BandData> {
        let inner = self.inner.read().await;
        tail(&inner.band_history, limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
    }

    pub async fn append_band(&self, input: NewBand) -> BandData {
        let mut inner = self.inner.write().await;
        let point = BandData {
            id: next(&mut inner.ids.band),
            premium: input.premium,
            upper_band: input.upper_band,
            lower_band: input.lower_band,
            m1_close: input.m1_close,
            bollinger_upper_band: input.bollinger_upper_band,
            bollinger_lower_band: input.bollinger_lower_band,
            timestamp: Utc::now(),
        };
        inner.band_history.push_back(point.clone());
        while inner.band_history.len() > HISTORY_CAP {
            inner.band_history.pop_front();
        }
        point
    }

    // --- quotes ---

    pub async fn latest_quote(&self, symbol: &str) -> Option<QuoteData> {
        self.inner
            .read()
            .await
            .quote_history
            .get(symbol)
            .and_then(|h| h.back())
            .cloned()
    }

    pub async fn quote_history(&self, symbol: &str, limit: Option<usize>) -> Vec<QuoteData> {
        let inner = self.inner.read().await;
        inner
            .quote_history
            .get(symbol)
            .map(|h| tail(h, limit.unwrap_or(DEFAULT_HISTORY_LIMIT)))
            .unwrap_or_default()
    }

    pub async fn append_quote(&self, symbol: &str, price: f64, change: f64) -> QuoteData {
        let mut inner = self.inner.write().await;
        let quote = QuoteData {
            id: next(&mut inner.ids.quote),
            symbol: symbol.to_string(),
            price,
            change,
            timestamp: Utc::now(),
        };
        let history = inner
            .quote_history
            .entry(symbol.to_string())
            .or_default();
        history.push_back(quote.clone());
        while history.len() > HISTORY_CAP {
            history.pop_front();
        }
        quote
    }
}
