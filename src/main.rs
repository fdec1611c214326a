use bandboard::application::actors::simulator;
use bandboard::application::{routes, AppState};
use bandboard::config::ServerConfig;
use bandboard::persistence::snapshot;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bandboard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    info!("Premium band dashboard server starting...");
    info!("Snapshot directory: {}", config.config_dir.display());

    let state = AppState::new(config.clone());

    // Seed the store from the snapshot files, if any
    let seed = snapshot::load(&config.config_dir).await;
    if !seed.accounts.is_empty() {
        info!("Seeded {} account(s) from snapshot", seed.accounts.len());
        state.store.seed_accounts(seed.accounts).await;
    }
    state.store.seed_settings(seed.settings).await;
    if let Some(program_state) = seed.program_state {
        state.store.seed_program_state(program_state.running).await;
    }
    simulator::seed_service_statuses(&state.store).await;

    if config.simulator_enabled {
        simulator::spawn(state.clone());
    }

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);
    let server = axum::serve(listener, app);

    let shutdown_signal = async move {
        let ctrl_c = async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Received Ctrl+C signal"),
                Err(e) => error!("Failed to install Ctrl+C handler: {}", e),
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                    info!("Received SIGTERM signal");
                }
                Err(e) => error!("Failed to install SIGTERM handler: {}", e),
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    };

    info!("Server started successfully. Press Ctrl+C to stop.");
    server.with_graceful_shutdown(shutdown_signal).await?;

    info!("Server shutting down gracefully...");
    Ok(())
}
