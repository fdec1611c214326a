//! Viewer-side client: one duplex channel plus local mirrors of every
//! collection, kept consistent by applying the event stream.
//!
//! Reconnection is a single explicit state machine with an injectable
//! backoff policy, instead of ad-hoc retry logic per call site. Outgoing
//! messages (only the legacy program toggle exists) queue while the channel
//! is down and flush on open.

use crate::application::store::HISTORY_CAP;
use crate::domain::entities::{
    BandData, LogEntry, Order, Position, ProgramState, QuoteData, ServiceStatus, SettingType,
};
use crate::domain::events::{ClientMessage, ServerEvent};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::{Mutex, Notify, RwLock};
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use url::Url;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Sink = SplitSink<Socket, Message>;

/// Connection states for the viewer's duplex channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerState {
    Connecting,
    Open,
    Reconnecting,
    Failed,
}

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("reconnect attempts exhausted after {attempts} tries")]
    ReconnectExhausted { attempts: u32 },
}

/// Exponential reconnect backoff: `min(cap, base * 2^attempt)`.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub cap: Duration,
    pub max_attempts: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        BackoffPolicy {
            base: Duration::from_secs(1),
            cap: Duration::from_secs(30),
            max_attempts: 10,
        }
    }
}

impl BackoffPolicy {
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base.checked_mul(factor).unwrap_or(self.cap).min(self.cap)
    }
}

/// Local mirrors of every collection a viewer renders.
#[derive(Debug, Clone, Default)]
pub struct ViewerMirrors {
    pub orders: Vec<Order>,
    pub positions: Vec<Position>,
    pub logs: Vec<LogEntry>,
    pub band_history: Vec<BandData>,
    pub quotes: HashMap<String, QuoteData>,
    pub service_statuses: Vec<ServiceStatus>,
    pub program_state: Option<ProgramState>,
    pub settings: HashMap<SettingType, serde_json::Value>,
}

impl ViewerMirrors {
    /// Apply one event: replace for snapshot events, upsert by id for
    /// single-entity updates, append-and-cap for bounded histories,
    /// remove by id for deletes.
    pub fn apply(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::BandDataUpdated(point) => {
                self.band_history.push(point);
                if self.band_history.len() > HISTORY_CAP {
                    self.band_history.remove(0);
                }
            }
            ServerEvent::PositionsUpdated(positions) => self.positions = positions,
            ServerEvent::OrdersUpdated(orders) => self.orders = orders,
            ServerEvent::OrderAdded(order) | ServerEvent::OrderUpdated(order) => {
                match self.orders.iter_mut().find(|o| o.id == order.id) {
                    Some(existing) => *existing = order,
                    None => self.orders.push(order),
                }
            }
            ServerEvent::OrderDeleted(deleted) => {
                self.orders.retain(|o| o.id != deleted.id);
            }
            ServerEvent::ServiceStatusUpdated(statuses) => self.service_statuses = statuses,
            ServerEvent::LogAdded(entry) => {
                self.logs.push(entry);
                if self.logs.len() > HISTORY_CAP {
                    self.logs.remove(0);
                }
            }
            ServerEvent::LogsUpdated(entries) => self.logs = entries,
            ServerEvent::ProgramStateUpdated(state) => self.program_state = Some(state),
            ServerEvent::QuoteUpdated(quote) => {
                self.quotes.insert(quote.symbol.clone(), quote);
            }
            ServerEvent::SettingUpdated(setting) => {
                self.settings.insert(setting.setting_type, setting.data);
            }
        }
    }
}

pub struct ViewerClient {
    url: Url,
    backoff: BackoffPolicy,
    state: Arc<RwLock<ViewerState>>,
    mirrors: Arc<RwLock<ViewerMirrors>>,
    outbox: Arc<Mutex<Vec<ClientMessage>>>,
    outbox_ready: Arc<Notify>,
}

impl ViewerClient {
    pub fn new(url: &str) -> Result<Self, ViewerError> {
        Ok(ViewerClient {
            url: Url::parse(url)?,
            backoff: BackoffPolicy::default(),
            state: Arc::new(RwLock::new(ViewerState::Connecting)),
            mirrors: Arc::new(RwLock::new(ViewerMirrors::default())),
            outbox: Arc::new(Mutex::new(Vec::new())),
            outbox_ready: Arc::new(Notify::new()),
        })
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    pub async fn state(&self) -> ViewerState {
        *self.state.read().await
    }

    /// Current mirror snapshot (cloned, detached from the live client).
    pub async fn mirrors(&self) -> ViewerMirrors {
        self.mirrors.read().await.clone()
    }

    /// Queue the legacy toggle frame; sent immediately when the channel is
    /// open, otherwise flushed on the next open.
    pub async fn request_program_toggle(&self) {
        self.outbox.lock().await.push(ClientMessage::ToggleProgramState);
        self.outbox_ready.notify_one();
    }

    /// Drive the connection until the reconnect budget is exhausted.
    pub async fn run(&self) -> Result<(), ViewerError> {
        let mut attempt: u32 = 0;
        loop {
            *self.state.write().await = if attempt == 0 {
                ViewerState::Connecting
            } else {
                ViewerState::Reconnecting
            };

            match connect_async(self.url.as_str()).await {
                Ok((socket, _response)) => {
                    info!("viewer channel open: {}", self.url);
                    attempt = 0;
                    *self.state.write().await = ViewerState::Open;
                    self.drive(socket).await;
                    warn!("viewer channel closed");
                }
                Err(e) => warn!("viewer connect failed: {}", e),
            }

            if attempt >= self.backoff.max_attempts {
                *self.state.write().await = ViewerState::Failed;
                return Err(ViewerError::ReconnectExhausted { attempts: attempt });
            }
            let delay = self.backoff.delay(attempt);
            attempt += 1;
            debug!("reconnect attempt {} in {:?}", attempt, delay);
            sleep(delay).await;
        }
    }

    async fn drive(&self, socket: Socket) {
        let (mut sink, mut stream) = socket.split();
        self.flush_outbox(&mut sink).await;

        loop {
            tokio::select! {
                _ = self.outbox_ready.notified() => {
                    self.flush_outbox(&mut sink).await;
                }
                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => self.apply_frame(&text).await,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        // Any transport error counts as a close.
                        debug!("viewer channel error: {}", e);
                        break;
                    }
                },
            }
        }
    }

    async fn flush_outbox(&self, sink: &mut Sink) {
        let queued: Vec<ClientMessage> = {
            let mut outbox = self.outbox.lock().await;
            outbox.drain(..).collect()
        };
        for (index, message) in queued.iter().enumerate() {
            let payload = match serde_json::to_string(message) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!("skipping unserializable outgoing message: {}", e);
                    continue;
                }
            };
            if sink.send(Message::Text(payload)).await.is_err() {
                // Channel died mid-flush; keep the rest for the next open.
                let mut outbox = self.outbox.lock().await;
                for message in &queued[index..] {
                    outbox.push(*message);
                }
                return;
            }
        }
    }

    async fn apply_frame(&self, text: &str) {
        match serde_json::from_str::<ServerEvent>(text) {
            Ok(event) => self.mirrors.write().await.apply(event),
            Err(_) => match serde_json::from_str::<serde_json::Value>(text) {
                Ok(value) => debug!(
                    "ignoring event of unknown type {:?}",
                    value.get("type").and_then(|t| t.as_str())
                ),
                Err(e) => warn!("dropping unparsable frame: {}", e),
            },
        }
    }
}
