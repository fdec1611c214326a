//! Demo data generator.
//!
//! Drives "live" band and quote movement plus occasional log chatter for
//! demo purposes, through the same store-then-broadcast path the mutation
//! API uses. Real deployments feed band data from the external signal
//! system instead and turn this off.

use crate::application::store::{NewBand, NewServiceStatus, Store};
use crate::application::AppState;
use crate::domain::entities::LogLevel;
use crate::domain::events::ServerEvent;
use rand::Rng;
use tracing::info;

const DEMO_LOG_MESSAGES: &[(LogLevel, &str)] = &[
    (LogLevel::Info, "Heartbeat received from signal engine"),
    (LogLevel::Info, "Premium recalculated from upstream feed"),
    (LogLevel::Debug, "Quote subscription refreshed"),
    (LogLevel::Warning, "Upstream feed latency above threshold"),
    (LogLevel::Info, "Band parameters unchanged this cycle"),
];

/// Static demo rows for the service-status panel.
pub async fn seed_service_statuses(store: &Store) {
    store
        .replace_service_statuses(vec![
            NewServiceStatus {
                name: "Market Data Feed".to_string(),
                status: "Online".to_string(),
                details: None,
            },
            NewServiceStatus {
                name: "Order Gateway".to_string(),
                status: "Online".to_string(),
                details: None,
            },
            NewServiceStatus {
                name: "Signal Engine".to_string(),
                status: "Degraded".to_string(),
                details: Some("Running on delayed inputs".to_string()),
            },
        ])
        .await;
}

pub fn spawn(state: AppState) -> tokio::task::JoinHandle<()> {
    info!(
        "demo data generator enabled, tick every {:?}",
        state.config.simulator_interval
    );
    tokio::spawn(run(state))
}

async fn run(state: AppState) {
    let mut interval = tokio::time::interval(state.config.simulator_interval);
    let mut premium = 14.0;
    let mut price = 4300.0;

    loop {
        interval.tick().await;

        // Random values are drawn before any await; ThreadRng is not Send.
        let (band, new_price, change, chatter) = {
            let mut rng = rand::thread_rng();
            premium += rng.gen_range(-0.6..0.6);
            let half_width = 2.5 + rng.gen_range(0.0..0.8);
            let tick_move = rng.gen_range(-10..=10) as f64 * 0.25;
            let m1_close = price + tick_move;
            let band = NewBand {
                premium,
                upper_band: premium + half_width,
                lower_band: premium - half_width,
                m1_close: Some(m1_close),
                bollinger_upper_band: Some(m1_close + 10.0 + rng.gen_range(0.0..5.0)),
                bollinger_lower_band: Some(m1_close - 10.0 - rng.gen_range(0.0..5.0)),
            };
            let chatter = if rng.gen_bool(0.15) {
                Some(DEMO_LOG_MESSAGES[rng.gen_range(0..DEMO_LOG_MESSAGES.len())])
            } else {
                None
            };
            (band, m1_close, tick_move, chatter)
        };
        price = new_price;

        let point = state.store.append_band(band).await;
        state.events.publish(ServerEvent::BandDataUpdated(point));

        let quote = state
            .store
            .append_quote(&state.config.default_quote_symbol, price, change)
            .await;
        state.events.publish(ServerEvent::QuoteUpdated(quote));

        if let Some((level, message)) = chatter {
            let entry = state.store.append_log(level, message).await;
            state.events.publish(ServerEvent::LogAdded(entry));
        }
    }
}
