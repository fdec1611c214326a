use crate::application::AppState;
use crate::domain::entities::ProgramState;
use crate::domain::events::ServerEvent;
use axum::extract::State;
use axum::Json;
use chrono::Utc;

pub async fn get(State(state): State<AppState>) -> Json<ProgramState> {
    let current = state.store.program_state().await.unwrap_or(ProgramState {
        id: 1,
        running: false,
        updated_at: Utc::now(),
    });
    Json(current)
}

pub async fn toggle_route(State(state): State<AppState>) -> Json<ProgramState> {
    Json(toggle(&state).await)
}

/// Shared by the REST route and the legacy WebSocket frame: flip, snapshot,
/// broadcast the new state plus the transition log entry.
pub async fn toggle(state: &AppState) -> ProgramState {
    let (program_state, log) = state.store.toggle_program_state().await;
    state.snapshots.program_state(program_state.running);
    state
        .events
        .publish(ServerEvent::ProgramStateUpdated(program_state));
    state.events.publish(ServerEvent::LogAdded(log));
    program_state
}
