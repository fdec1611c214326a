use crate::application::actors::ws_session;
use crate::application::handlers::{
    accounts, logs, market_data, orders, positions, program_state, service_status, settings,
};
use crate::application::AppState;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// The full HTTP surface, shared by `main` and the end-to-end tests.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
        .route("/api/accounts", get(accounts::list).post(accounts::create))
        .route(
            "/api/accounts/:id",
            put(accounts::update).delete(accounts::delete),
        )
        .route("/api/orders", get(orders::list).post(orders::create))
        .route("/api/orders/:id", put(orders::update).delete(orders::delete))
        .route("/api/positions", get(positions::list))
        .route("/api/logs", get(logs::list).post(logs::create))
        .route("/api/settings/:type", get(settings::get).post(settings::upsert))
        .route("/api/service-status", get(service_status::list))
        .route("/api/program-state", get(program_state::get))
        .route("/api/program-state/toggle", post(program_state::toggle_route))
        .route("/api/band-data", get(market_data::latest_band))
        .route("/api/band-data/history", get(market_data::band_history))
        .route("/api/quote/:symbol", get(market_data::latest_quote))
        .route(
            "/api/quote/:symbol/history",
            get(market_data::quote_history),
        )
        .route("/ws", get(ws_session::upgrade))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

async fn banner() -> &'static str {
    "Premium band dashboard server is running!"
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<serde_json::Value> {
    let running = state
        .store
        .program_state()
        .await
        .map(|s| s.running)
        .unwrap_or(false);
    Json(json!({
        "status": "running",
        "viewers": state.events.viewer_count(),
        "programRunning": running,
    }))
}
