pub mod actors;
pub mod broadcaster;
pub mod handlers;
pub mod routes;
pub mod store;
pub mod validation;

use crate::application::broadcaster::Broadcaster;
use crate::application::store::Store;
use crate::config::ServerConfig;
use crate::persistence::writer::SnapshotWriter;
use std::sync::Arc;

/// Everything a request handler needs, injected via axum state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub events: Broadcaster,
    pub snapshots: SnapshotWriter,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let snapshots = SnapshotWriter::spawn(config.config_dir.clone());
        AppState {
            store: Arc::new(Store::new()),
            events: Broadcaster::new(),
            snapshots,
            config: Arc::new(config),
        }
    }
}
