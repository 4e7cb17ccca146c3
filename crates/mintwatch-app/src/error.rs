//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] mintwatch_ws::WsError),

    #[error("Enrichment error: {0}")]
    Enrich(#[from] mintwatch_enrich::EnrichError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] mintwatch_telemetry::TelemetryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
