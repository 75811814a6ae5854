use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_CONFIG_PATH: &str = "relay.toml";
pub const HANDSHAKE_TIMEOUT_SECS: u64 = 60; // bound on serving one HTTP request
pub const QUEUE_CAPACITY: usize = 256; // per-client outbound frames before eviction
pub const MAX_PAYLOAD_BYTES: usize = 128 * 1024; // 128 KB hard cap per inbound frame
pub const HEARTBEAT_INTERVAL_SECS: u64 = 30; // writer ping cadence
pub const HUB_COMMAND_CAPACITY: usize = 1024;

/// Top-level config (relay.toml + RELAY_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub hub: HubConfig,
}

/// Listener settings for the HTTP/WS front door.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Requests (including the WS upgrade handshake) that take longer than
    /// this are answered with 408.
    #[serde(default = "default_handshake_timeout")]
    pub handshake_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            handshake_timeout_secs: default_handshake_timeout(),
        }
    }
}

/// Fan-out and per-connection tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Outbound frames buffered per client. A client whose queue is full
    /// when a broadcast arrives is evicted.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "default_max_payload")]
    pub max_payload_bytes: usize,
    /// Ping cadence for the writer loop. `0` disables pings.
    #[serde(default = "default_heartbeat")]
    pub heartbeat_interval_secs: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            max_payload_bytes: default_max_payload(),
            heartbeat_interval_secs: default_heartbeat(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_handshake_timeout() -> u64 {
    HANDSHAKE_TIMEOUT_SECS
}
fn default_queue_capacity() -> usize {
    QUEUE_CAPACITY
}
fn default_max_payload() -> usize {
    MAX_PAYLOAD_BYTES
}
fn default_heartbeat() -> u64 {
    HEARTBEAT_INTERVAL_SECS
}

impl RelayConfig {
    /// Load config from a TOML file with RELAY_* env var overrides.
    ///
    /// Nested keys use a double underscore: `RELAY_SERVER__PORT=9000`,
    /// `RELAY_HUB__QUEUE_CAPACITY=64`. A missing file yields the defaults.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path.unwrap_or(DEFAULT_CONFIG_PATH);

        let config: RelayConfig = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("RELAY_").split("__"))
            .extract()
            .map_err(|e| crate::error::RelayError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the hub cannot run with.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.hub.queue_capacity == 0 {
            return Err(crate::error::RelayError::Config(
                "hub.queue_capacity must be at least 1".to_string(),
            ));
        }
        if self.hub.max_payload_bytes == 0 {
            return Err(crate::error::RelayError::Config(
                "hub.max_payload_bytes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// `bind:port` string for the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }
}
