//! WebSocket connection manager.
//!
//! Handles connection lifecycle, automatic reconnection with exponential
//! backoff, the one-shot new-token subscription, and the periodic
//! keep-alive ping.
//!
//! Recovery is a single backoff loop: the base delay doubles per
//! consecutive failure up to a ceiling and resets on a successful
//! connection. `max_reconnect_attempts` bounds the loop when non-zero.

use crate::error::{WsError, WsResult};
use crate::message::{parse_feed_message, PingMessage, SubscribeRequest, TokenEvent};
use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::{connect_async_tls_with_config, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// WebSocket URL.
    pub url: String,
    /// Maximum reconnection attempts (0 = infinite).
    pub max_reconnect_attempts: u32,
    /// Base delay between reconnection attempts.
    pub reconnect_base_delay_ms: u64,
    /// Maximum delay for exponential backoff.
    pub reconnect_max_delay_ms: u64,
    /// Keep-alive ping interval.
    pub keepalive_interval_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_reconnect_attempts: 0, // Infinite
            reconnect_base_delay_ms: 3000,
            reconnect_max_delay_ms: 30000,
            keepalive_interval_ms: 30000,
        }
    }
}

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Disconnected => write!(f, "disconnected"),
        }
    }
}

/// WebSocket connection manager.
///
/// Owns the single feed stream. New-token events go out over the event
/// channel; state changes are published on a watch channel so any number
/// of subscribers can observe them.
pub struct ConnectionManager {
    config: ConnectionConfig,
    state_tx: watch::Sender<ConnectionState>,
    event_tx: mpsc::Sender<TokenEvent>,
    reconnect_count: Arc<RwLock<u32>>,
    /// Cancellation token for graceful shutdown.
    shutdown_token: CancellationToken,
}

impl ConnectionManager {
    /// Create a new connection manager.
    pub fn new(config: ConnectionConfig, event_tx: mpsc::Sender<TokenEvent>) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            config,
            state_tx,
            event_tx,
            reconnect_count: Arc::new(RwLock::new(0)),
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Get current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// Subscribe to connection-state changes.
    pub fn state_watch(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Signal graceful shutdown.
    ///
    /// Cancels the shutdown token, which makes the message loop and any
    /// pending backoff sleep exit promptly. The keep-alive timer dies with
    /// the loop, so nothing fires against a torn-down connection.
    pub fn shutdown(&self) {
        info!("ConnectionManager shutdown requested");
        self.shutdown_token.cancel();
    }

    /// Check if shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    /// Connect to the feed and run the message loop until shutdown.
    ///
    /// Idempotent: while a loop already owns the stream (state is
    /// connecting or connected), a second call does nothing. Reconnection
    /// happens inside the loop.
    pub async fn connect(&self) -> WsResult<()> {
        if self.state() != ConnectionState::Disconnected {
            debug!("connect() called while already active, ignoring");
            return Ok(());
        }
        self.connect_with_retry().await
    }

    async fn connect_with_retry(&self) -> WsResult<()> {
        loop {
            // Check shutdown flag at start of loop
            if self.is_shutdown() {
                info!("Shutdown requested, exiting connect loop");
                self.set_state(ConnectionState::Disconnected);
                return Ok(());
            }

            self.set_state(ConnectionState::Connecting);

            match self.try_connect().await {
                Ok(()) => {
                    info!("WebSocket connection closed");
                }
                Err(e) => {
                    error!(?e, "WebSocket connection error");
                }
            }

            self.set_state(ConnectionState::Disconnected);

            // Check shutdown flag before reconnect attempt
            if self.is_shutdown() {
                info!("Shutdown requested after disconnect, not reconnecting");
                return Ok(());
            }

            let attempt = *self.reconnect_count.read() + 1;
            *self.reconnect_count.write() = attempt;

            if self.config.max_reconnect_attempts > 0
                && attempt > self.config.max_reconnect_attempts
            {
                error!(attempt, "Max reconnection attempts reached");
                return Err(WsError::ConnectionFailed(
                    "Max reconnection attempts reached".to_string(),
                ));
            }

            let delay = self.calculate_backoff_delay(attempt);
            warn!(attempt, delay_ms = delay.as_millis(), "Reconnecting");

            // Wait for delay OR shutdown signal (cancellation-aware sleep)
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = self.shutdown_token.cancelled() => {
                    info!("Shutdown requested during backoff, exiting");
                    return Ok(());
                }
            }
        }
    }

    async fn try_connect(&self) -> WsResult<()> {
        info!(url = %self.config.url, "Connecting to token feed");

        // TCP_NODELAY for lower latency
        let (ws_stream, _response) =
            connect_async_tls_with_config(&self.config.url, None, true, None).await?;
        let (mut write, mut read) = ws_stream.split();

        self.set_state(ConnectionState::Connected);
        *self.reconnect_count.write() = 0;
        info!("WebSocket connected");

        // Single subscription request for new-token events
        let subscribe = serde_json::to_string(&SubscribeRequest::new_token())?;
        write.send(Message::Text(subscribe)).await?;
        debug!("Sent new-token subscription");

        // Keep-alive ticks after one full interval, not immediately
        let period = Duration::from_millis(self.config.keepalive_interval_ms);
        let mut keepalive = tokio::time::interval_at(tokio::time::Instant::now() + period, period);

        // Message loop
        loop {
            tokio::select! {
                () = self.shutdown_token.cancelled() => {
                    info!("Shutdown signal received in message loop");
                    if let Err(e) = write.send(Message::Close(None)).await {
                        warn!(?e, "Failed to send Close frame during shutdown");
                    }
                    return Ok(());
                }

                // Incoming message
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            self.handle_text_message(&text).await;
                        }
                        Some(Ok(Message::Ping(data))) => {
                            debug!("Received ping, sending pong");
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Pong(_))) => {
                            // Keep-alive is one-way; nothing to track
                            debug!("Received pong");
                        }
                        Some(Ok(Message::Close(frame))) => {
                            let (code, reason) = frame
                                .map(|f| (f.code.into(), f.reason.to_string()))
                                .unwrap_or((1000, "Normal close".to_string()));
                            warn!(code, %reason, "WebSocket closed by server");
                            return Err(WsError::ConnectionClosed { code, reason });
                        }
                        Some(Err(e)) => {
                            error!(?e, "WebSocket read error");
                            return Err(e.into());
                        }
                        None => {
                            warn!("WebSocket stream ended");
                            return Ok(());
                        }
                        _ => {}
                    }
                }

                // Keep-alive ping
                _ = keepalive.tick() => {
                    let ping = serde_json::to_string(&PingMessage::new())?;
                    write.send(Message::Text(ping)).await?;
                    debug!("Sent keep-alive ping");
                }
            }
        }
    }

    /// Decode one inbound frame and forward any new-token event.
    ///
    /// Malformed payloads are logged and dropped; they never terminate the
    /// connection.
    async fn handle_text_message(&self, text: &str) {
        match parse_feed_message(text) {
            Ok(Some(event)) => {
                debug!(mint = %event.mint, "New token event");
                if self.event_tx.send(event).await.is_err() {
                    warn!("Token event receiver dropped");
                }
            }
            Ok(None) => {
                debug!("Ignoring non-token message");
            }
            Err(e) => {
                warn!(?e, "Malformed feed payload dropped");
            }
        }
    }

    fn set_state(&self, state: ConnectionState) {
        let previous = self.state_tx.send_replace(state);
        if previous != state {
            debug!(%state, "Connection state changed");
        }
    }

    fn calculate_backoff_delay(&self, attempt: u32) -> Duration {
        let base = self.config.reconnect_base_delay_ms;
        let max = self.config.reconnect_max_delay_ms;

        // Exponential backoff: base * 2^(attempt-1), capped
        let exponent = attempt.saturating_sub(1).min(10);
        let delay = base.saturating_mul(1u64 << exponent);
        Duration::from_millis(delay.min(max))
    }
}
