//! Application crate for the mintwatch token scanner.
//!
//! Wires the feed connection manager, the enrichment pipeline, and the
//! token roster together under an explicitly owned lifecycle.

pub mod app;
pub mod config;
pub mod error;

pub use app::Application;
pub use config::{AppConfig, WsConfig};
pub use error::{AppError, AppResult};
