//! Telemetry for the mintwatch token scanner.
//!
//! Structured logging via `tracing`: JSON output in production, pretty
//! output for development.

pub mod error;
pub mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
