use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Runtime configuration for the dashboard server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Directory holding the JSON snapshot files.
    pub config_dir: PathBuf,
    /// Symbol whose quote is pushed during the bootstrap handshake.
    pub default_quote_symbol: String,
    /// Demo data generator on/off and tick interval.
    pub simulator_enabled: bool,
    pub simulator_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            config_dir: PathBuf::from("./config"),
            default_quote_symbol: "ES".to_string(),
            simulator_enabled: true,
            simulator_interval: Duration::from_secs(2),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by environment variables. Unparsable values are
    /// warned about and fall back to the default.
    pub fn from_env() -> Self {
        let mut config = ServerConfig::default();
        if let Ok(raw) = std::env::var("BANDBOARD_BIND_ADDR") {
            match raw.parse() {
                Ok(addr) => config.bind_addr = addr,
                Err(_) => warn!("ignoring invalid BANDBOARD_BIND_ADDR '{}'", raw),
            }
        }
        if let Ok(dir) = std::env::var("BANDBOARD_CONFIG_DIR") {
            config.config_dir = PathBuf::from(dir);
        }
        if let Ok(symbol) = std::env::var("BANDBOARD_DEFAULT_SYMBOL") {
            if !symbol.trim().is_empty() {
                config.default_quote_symbol = symbol;
            }
        }
        if let Ok(raw) = std::env::var("BANDBOARD_SIMULATOR") {
            config.simulator_enabled = !matches!(raw.as_str(), "0" | "false" | "off");
        }
        if let Ok(raw) = std::env::var("BANDBOARD_SIMULATOR_INTERVAL_MS") {
            match raw.parse::<u64>() {
                Ok(ms) if ms > 0 => config.simulator_interval = Duration::from_millis(ms),
                _ => warn!("ignoring invalid BANDBOARD_SIMULATOR_INTERVAL_MS '{}'", raw),
            }
        }
        config
    }
}
