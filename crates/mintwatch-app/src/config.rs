//! Application configuration.

use crate::error::{AppError, AppResult};
use mintwatch_enrich::EnrichConfig;
use mintwatch_roster::DEFAULT_CAPACITY;
use mintwatch_ws::ConnectionConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// WebSocket configuration subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsConfig {
    /// Feed endpoint URL.
    #[serde(default = "default_ws_url")]
    pub url: String,
    /// Maximum reconnection attempts (0 = infinite).
    #[serde(default)]
    pub max_reconnect_attempts: u32,
    /// Base delay between reconnection attempts (ms).
    #[serde(default = "default_reconnect_base_delay_ms")]
    pub reconnect_base_delay_ms: u64,
    /// Keep-alive ping interval (ms).
    #[serde(default = "default_keepalive_interval_ms")]
    pub keepalive_interval_ms: u64,
}

fn default_ws_url() -> String {
    "wss://pumpportal.fun/api/data".to_string()
}

fn default_reconnect_base_delay_ms() -> u64 {
    3000
}

fn default_keepalive_interval_ms() -> u64 {
    30000
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: default_ws_url(),
            max_reconnect_attempts: 0,
            reconnect_base_delay_ms: default_reconnect_base_delay_ms(),
            keepalive_interval_ms: default_keepalive_interval_ms(),
        }
    }
}

impl From<WsConfig> for ConnectionConfig {
    fn from(cfg: WsConfig) -> Self {
        Self {
            url: cfg.url,
            max_reconnect_attempts: cfg.max_reconnect_attempts,
            reconnect_base_delay_ms: cfg.reconnect_base_delay_ms,
            reconnect_max_delay_ms: 30000,
            keepalive_interval_ms: cfg.keepalive_interval_ms,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Roster capacity.
    #[serde(default = "default_roster_capacity")]
    pub roster_capacity: usize,
    /// Default log filter directive (overridden by RUST_LOG).
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Feed connection configuration.
    #[serde(default)]
    pub ws: WsConfig,
    /// Enrichment source configuration.
    #[serde(default)]
    pub enrich: EnrichConfig,
}

fn default_roster_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_log_filter() -> String {
    "info,mintwatch=debug".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            roster_capacity: default_roster_capacity(),
            log_filter: default_log_filter(),
            ws: WsConfig::default(),
            enrich: EnrichConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration, falling back to defaults when the file is absent.
    pub fn load(path: &str) -> AppResult<Self> {
        if Path::new(path).exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }
}
