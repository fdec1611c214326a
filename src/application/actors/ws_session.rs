//! Server side of the duplex viewer channel.
//!
//! Each connection gets the one-time bootstrap handshake, then relays
//! broadcast events until the socket closes. The only inbound frame is the
//! legacy `toggleProgramState` message; anything unparsable is logged and
//! dropped without closing the channel.

use crate::application::handlers::program_state;
use crate::application::AppState;
use crate::domain::events::{ClientMessage, ServerEvent};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

pub async fn upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// The bootstrap handshake: one snapshot event per collection, fixed order,
/// collections without data omitted rather than sent empty.
pub async fn bootstrap_events(state: &AppState) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    if let Some(band) = state.store.latest_band().await {
        events.push(ServerEvent::BandDataUpdated(band));
    }
    let positions = state.store.list_positions(None).await;
    if !positions.is_empty() {
        events.push(ServerEvent::PositionsUpdated(positions));
    }
    let orders = state.store.list_orders(None).await;
    if !orders.is_empty() {
        events.push(ServerEvent::OrdersUpdated(orders));
    }
    let statuses = state.store.list_service_statuses().await;
    if !statuses.is_empty() {
        events.push(ServerEvent::ServiceStatusUpdated(statuses));
    }
    let logs = state.store.list_logs(None).await;
    if !logs.is_empty() {
        events.push(ServerEvent::LogsUpdated(logs));
    }
    if let Some(program_state) = state.store.program_state().await {
        events.push(ServerEvent::ProgramStateUpdated(program_state));
    }
    if let Some(quote) = state
        .store
        .latest_quote(&state.config.default_quote_symbol)
        .await
    {
        events.push(ServerEvent::QuoteUpdated(quote));
    }
    events
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();

    // Subscribe before the handshake so nothing emitted during it is lost.
    let mut events = state.events.subscribe();

    for event in bootstrap_events(&state).await {
        if send_event(&mut sink, &event).await.is_err() {
            return;
        }
    }
    debug!("viewer connected, {} now online", state.events.viewer_count());

    loop {
        tokio::select! {
            broadcast = events.recv() => match broadcast {
                Ok(event) => {
                    if send_event(&mut sink, &event).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    // Best-effort delivery: the slow viewer just misses them.
                    warn!("viewer lagging, {} event(s) skipped", missed);
                }
                Err(RecvError::Closed) => break,
            },
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => handle_frame(&state, &text).await,
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!("viewer channel error: {}", e);
                    break;
                }
            },
        }
    }
    debug!("viewer disconnected");
}

async fn send_event(
    sink: &mut SplitSink<WebSocket, Message>,
    event: &ServerEvent,
) -> Result<(), axum::Error> {
    let payload = serde_json::to_string(event).map_err(axum::Error::new)?;
    sink.send(Message::Text(payload)).await
}

async fn handle_frame(state: &AppState, text: &str) {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::ToggleProgramState) => {
            program_state::toggle(state).await;
        }
        Err(e) => warn!("dropping unparsable viewer frame: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::store::{NewBand, NewPosition};
    use crate::config::ServerConfig;
    use crate::domain::entities::LogLevel;

    fn test_state(dir: &std::path::Path) -> AppState {
        let mut config = ServerConfig::default();
        config.config_dir = dir.to_path_buf();
        config.simulator_enabled = false;
        AppState::new(config)
    }

    #[tokio::test]
    async fn test_bootstrap_omits_empty_collections() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        assert!(bootstrap_events(&state).await.is_empty());
    }

    #[tokio::test]
    async fn test_bootstrap_fixed_order() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        state
            .store
            .append_band(NewBand {
                premium: 10.0,
                upper_band: 12.0,
                lower_band: 8.0,
                m1_close: None,
                bollinger_upper_band: None,
                bollinger_lower_band: None,
            })
            .await;
        state
            .store
            .replace_positions(vec![NewPosition {
                account_id: 1,
                symbol: "ES".to_string(),
                quantity: Some(1.0),
                avg_price: Some(4300.0),
                pnl: None,
            }])
            .await;
        state.store.append_log(LogLevel::Info, "hello").await;
        state.store.seed_program_state(true).await;
        state.store.append_quote("ES", 4301.0, 0.5).await;

        let kinds: Vec<&'static str> = bootstrap_events(&state)
            .await
            .iter()
            .map(|e| e.kind())
            .collect();
        assert_eq!(
            kinds,
            vec![
                "bandDataUpdated",
                "positionsUpdated",
                "logsUpdated",
                "programStateUpdated",
                "quoteUpdated",
            ]
        );
    }

    #[tokio::test]
    async fn test_bootstrap_quote_uses_default_symbol() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        state.store.append_quote("NQ", 15000.0, 0.0).await;
        // default symbol is ES; the NQ quote must not appear
        assert!(bootstrap_events(&state).await.is_empty());
    }
}
