//! End-to-end scenarios: REST mutations, broadcast fan-out, bootstrap
//! handshake, and the viewer client, against a real server on an ephemeral
//! port.

use bandboard::application::actors::viewer_client::{ViewerClient, ViewerState};
use bandboard::application::store::NewBand;
use bandboard::application::{routes, AppState};
use bandboard::config::ServerConfig;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

async fn spawn_server() -> (SocketAddr, AppState, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ServerConfig::default();
    config.config_dir = dir.path().to_path_buf();
    config.simulator_enabled = false;
    let state = AppState::new(config);

    let app = routes::router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, state, dir)
}

async fn connect_viewer(addr: SocketAddr) -> WsStream {
    let (socket, _) = connect_async(format!("ws://{}/ws", addr)).await.unwrap();
    socket
}

/// The upgrade response races the server-side subscription; wait for the
/// session task to be live before mutating, or it may miss the broadcast.
async fn wait_for_viewers(state: &AppState, count: usize) {
    for _ in 0..200 {
        if state.events.viewer_count() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("viewer session never subscribed");
}

async fn next_event(socket: &mut WsStream) -> Value {
    loop {
        let frame = timeout(Duration::from_secs(2), socket.next())
            .await
            .expect("timed out waiting for an event")
            .expect("channel closed")
            .expect("transport error");
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

fn sample_account() -> Value {
    json!({
        "name": "Acct1",
        "broker": "IB",
        "apiKey": "k",
        "apiSecret": "s",
        "active": true
    })
}

fn sample_order() -> Value {
    json!({
        "accountId": 1,
        "symbol": "ES",
        "side": "Buy",
        "quantity": 1,
        "price": 4300,
        "orderType": "Limit",
        "timeInForce": "Day",
        "status": "Working"
    })
}

#[tokio::test]
async fn test_account_create_is_listed_but_not_broadcast() {
    let (addr, state, _dir) = spawn_server().await;
    let client = reqwest::Client::new();
    let mut viewer = connect_viewer(addr).await;
    wait_for_viewers(&state, 1).await;

    let response = client
        .post(format!("http://{}/api/accounts", addr))
        .json(&sample_account())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let account: Value = response.json().await.unwrap();
    assert!(account["id"].as_i64().unwrap() >= 1);

    let listed: Vec<Value> = client
        .get(format!("http://{}/api/accounts", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed.iter().any(|a| a["name"] == "Acct1"));

    // Account mutations do not broadcast: the next event a viewer sees must
    // be this marker, not anything account-related.
    client
        .post(format!("http://{}/api/logs", addr))
        .json(&json!({"level": "Info", "message": "marker"}))
        .send()
        .await
        .unwrap();
    let event = next_event(&mut viewer).await;
    assert_eq!(event["type"], "logAdded");
    assert_eq!(event["data"]["message"], "marker");
}

#[tokio::test]
async fn test_order_create_broadcasts_order_and_log() {
    let (addr, state, _dir) = spawn_server().await;
    let client = reqwest::Client::new();
    let mut viewer = connect_viewer(addr).await;
    wait_for_viewers(&state, 1).await;

    let response = client
        .post(format!("http://{}/api/orders", addr))
        .json(&sample_order())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let order: Value = response.json().await.unwrap();

    // The broadcast payload is exactly the entity the response returned.
    let added = next_event(&mut viewer).await;
    assert_eq!(added["type"], "orderAdded");
    assert_eq!(added["data"], order);

    let logged = next_event(&mut viewer).await;
    assert_eq!(logged["type"], "logAdded");
    assert!(logged["data"]["message"]
        .as_str()
        .unwrap()
        .contains("Buy 1 ES @ 4300"));

    let logs: Vec<Value> = client
        .get(format!("http://{}/api/logs", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(logs.iter().any(|l| {
        l["level"] == "Info" && l["message"].as_str().unwrap().contains("Buy 1 ES @ 4300")
    }));
}

#[tokio::test]
async fn test_order_update_and_delete_broadcasts() {
    let (addr, _state, _dir) = spawn_server().await;
    let client = reqwest::Client::new();

    let order: Value = client
        .post(format!("http://{}/api/orders", addr))
        .json(&sample_order())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = order["id"].as_i64().unwrap();

    let mut viewer = connect_viewer(addr).await;
    // bootstrap: ordersUpdated + logsUpdated
    assert_eq!(next_event(&mut viewer).await["type"], "ordersUpdated");
    assert_eq!(next_event(&mut viewer).await["type"], "logsUpdated");

    let response = client
        .put(format!("http://{}/api/orders/{}", addr, id))
        .json(&json!({"status": "Filled"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let updated = next_event(&mut viewer).await;
    assert_eq!(updated["type"], "orderUpdated");
    assert_eq!(updated["data"]["status"], "Filled");
    assert_eq!(next_event(&mut viewer).await["type"], "logAdded");

    let response = client
        .delete(format!("http://{}/api/orders/{}", addr, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);
    let deleted = next_event(&mut viewer).await;
    assert_eq!(deleted["type"], "orderDeleted");
    assert_eq!(deleted["data"]["id"], id);
}

#[tokio::test]
async fn test_delete_unknown_order_is_404_with_no_broadcast() {
    let (addr, state, _dir) = spawn_server().await;
    let client = reqwest::Client::new();
    let mut viewer = connect_viewer(addr).await;
    wait_for_viewers(&state, 1).await;

    let response = client
        .delete(format!("http://{}/api/orders/999999", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    client
        .post(format!("http://{}/api/logs", addr))
        .json(&json!({"level": "Info", "message": "marker"}))
        .send()
        .await
        .unwrap();
    let event = next_event(&mut viewer).await;
    assert_eq!(event["type"], "logAdded");
    assert_eq!(event["data"]["message"], "marker");
}

#[tokio::test]
async fn test_validation_errors_enumerate_fields() {
    let (addr, _state, _dir) = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{}/api/accounts", addr))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Validation failed");
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"apiKey"));

    let response = client
        .post(format!("http://{}/api/orders", addr))
        .json(&json!({
            "accountId": 1, "symbol": "ES", "side": "Hold",
            "quantity": 1, "price": 4300, "orderType": "Limit"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["errors"][0]["field"], "side");
}

#[tokio::test]
async fn test_settings_upsert_and_fetch() {
    let (addr, state, _dir) = spawn_server().await;
    let client = reqwest::Client::new();
    let mut viewer = connect_viewer(addr).await;
    wait_for_viewers(&state, 1).await;

    let data = json!({"tradingEnabled": true, "maxContracts": 3});
    for _ in 0..2 {
        let response = client
            .post(format!("http://{}/api/settings/global", addr))
            .json(&json!({"type": "global", "data": data.clone()}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let stored: Value = response.json().await.unwrap();
        assert_eq!(stored, data);

        let event = next_event(&mut viewer).await;
        assert_eq!(event["type"], "settingUpdated");
        assert_eq!(event["data"]["data"], data);
    }

    let fetched: Value = client
        .get(format!("http://{}/api/settings/global", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, data);

    let missing = client
        .get(format!("http://{}/api/settings/daily", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);

    let invalid = client
        .get(format!("http://{}/api/settings/weekly", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(invalid.status(), 400);
}

#[tokio::test]
async fn test_band_history_limit_returns_most_recent_oldest_first() {
    let (addr, state, _dir) = spawn_server().await;
    let client = reqwest::Client::new();

    for i in 0..10 {
        state
            .store
            .append_band(NewBand {
                premium: 10.0 + i as f64,
                upper_band: 13.0 + i as f64,
                lower_band: 7.0 + i as f64,
                m1_close: None,
                bollinger_upper_band: None,
                bollinger_lower_band: None,
            })
            .await;
    }

    let history: Vec<Value> = client
        .get(format!("http://{}/api/band-data/history?limit=5", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ids: Vec<i64> = history.iter().map(|b| b["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![6, 7, 8, 9, 10]);

    let latest: Value = client
        .get(format!("http://{}/api/band-data", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(latest["id"], 10);
}

#[tokio::test]
async fn test_quote_endpoints() {
    let (addr, state, _dir) = spawn_server().await;
    let client = reqwest::Client::new();

    let missing = client
        .get(format!("http://{}/api/quote/ES", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);

    state.store.append_quote("ES", 4300.0, 0.25).await;
    state.store.append_quote("ES", 4300.5, 0.5).await;

    let quote: Value = client
        .get(format!("http://{}/api/quote/ES", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(quote["price"], 4300.5);

    let history: Vec<Value> = client
        .get(format!("http://{}/api/quote/ES/history", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn test_bootstrap_handshake_order() {
    let (addr, state, _dir) = spawn_server().await;
    let client = reqwest::Client::new();

    state
        .store
        .append_band(NewBand {
            premium: 12.0,
            upper_band: 14.0,
            lower_band: 10.0,
            m1_close: Some(4300.0),
            bollinger_upper_band: None,
            bollinger_lower_band: None,
        })
        .await;
    client
        .post(format!("http://{}/api/orders", addr))
        .json(&sample_order())
        .send()
        .await
        .unwrap();
    client
        .post(format!("http://{}/api/program-state/toggle", addr))
        .send()
        .await
        .unwrap();
    state.store.append_quote("ES", 4301.0, 1.0).await;

    let mut viewer = connect_viewer(addr).await;
    let kinds: Vec<String> = {
        let mut kinds = Vec::new();
        for _ in 0..5 {
            kinds.push(next_event(&mut viewer).await["type"].as_str().unwrap().to_string());
        }
        kinds
    };
    assert_eq!(
        kinds,
        vec![
            "bandDataUpdated",
            "ordersUpdated",
            "logsUpdated",
            "programStateUpdated",
            "quoteUpdated",
        ]
    );
}

#[tokio::test]
async fn test_program_toggle_via_rest_and_ws_frame() {
    let (addr, state, _dir) = spawn_server().await;
    let client = reqwest::Client::new();
    let mut viewer = connect_viewer(addr).await;
    wait_for_viewers(&state, 1).await;

    let toggled: Value = client
        .post(format!("http://{}/api/program-state/toggle", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(toggled["running"], true);
    assert_eq!(next_event(&mut viewer).await["type"], "programStateUpdated");
    let log = next_event(&mut viewer).await;
    assert_eq!(log["data"]["message"], "Program started");

    // The legacy channel frame has the same effect as the REST toggle.
    viewer
        .send(Message::Text(r#"{"type":"toggleProgramState"}"#.to_string()))
        .await
        .unwrap();
    let event = next_event(&mut viewer).await;
    assert_eq!(event["type"], "programStateUpdated");
    assert_eq!(event["data"]["running"], false);
    let log = next_event(&mut viewer).await;
    assert_eq!(log["data"]["message"], "Program stopped");

    let current: Value = client
        .get(format!("http://{}/api/program-state", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(current["running"], false);
}

#[tokio::test]
async fn test_unparsable_ws_frame_is_dropped_without_closing() {
    let (addr, state, _dir) = spawn_server().await;
    let client = reqwest::Client::new();
    let mut viewer = connect_viewer(addr).await;
    wait_for_viewers(&state, 1).await;

    viewer
        .send(Message::Text("not json at all".to_string()))
        .await
        .unwrap();

    // Channel must still be alive and receiving events.
    client
        .post(format!("http://{}/api/logs", addr))
        .json(&json!({"level": "Info", "message": "still alive"}))
        .send()
        .await
        .unwrap();
    let event = next_event(&mut viewer).await;
    assert_eq!(event["data"]["message"], "still alive");
}

#[tokio::test]
async fn test_viewer_client_mirrors_and_toggle() {
    let (addr, state, _dir) = spawn_server().await;
    let client = reqwest::Client::new();

    let viewer = Arc::new(ViewerClient::new(&format!("ws://{}/ws", addr)).unwrap());
    let runner = viewer.clone();
    tokio::spawn(async move {
        let _ = runner.run().await;
    });

    // Wait until the channel is open before mutating.
    for _ in 0..100 {
        if viewer.state().await == ViewerState::Open {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    wait_for_viewers(&state, 1).await;

    client
        .post(format!("http://{}/api/orders", addr))
        .json(&sample_order())
        .send()
        .await
        .unwrap();

    let mut synced = false;
    for _ in 0..200 {
        let mirrors = viewer.mirrors().await;
        if mirrors.orders.len() == 1 && !mirrors.logs.is_empty() {
            assert_eq!(mirrors.orders[0].symbol, "ES");
            synced = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(synced, "viewer mirrors never caught up");

    viewer.request_program_toggle().await;
    let mut toggled = false;
    for _ in 0..200 {
        if viewer
            .mirrors()
            .await
            .program_state
            .map(|s| s.running)
            .unwrap_or(false)
        {
            toggled = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(toggled, "program toggle never reflected in mirrors");
}
