use crate::application::AppState;
use crate::domain::entities::ServiceStatus;
use axum::extract::State;
use axum::Json;

pub async fn list(State(state): State<AppState>) -> Json<Vec<ServiceStatus>> {
    Json(state.store.list_service_statuses().await)
}
