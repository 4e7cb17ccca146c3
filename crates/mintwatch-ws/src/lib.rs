//! WebSocket client for the launch-platform token feed.
//!
//! Provides robust connectivity with:
//! - Automatic reconnection with exponential backoff
//! - One-shot new-token subscription on connect
//! - One-way application-level keep-alive ping (30s)
//! - Channel-based event and connection-state delivery

pub mod connection;
pub mod error;
pub mod message;

pub use connection::{ConnectionConfig, ConnectionManager, ConnectionState};
pub use error::{WsError, WsResult};
pub use message::{parse_feed_message, PingMessage, SubscribeRequest, TokenEvent};

use std::sync::Once;

static INIT_CRYPTO: Once = Once::new();

/// Initialize the TLS crypto provider.
/// Must be called before any WebSocket connections are made.
pub fn init_crypto() {
    INIT_CRYPTO.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
