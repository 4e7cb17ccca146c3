//! Main application orchestration.
//!
//! Coordinates the components:
//! - feed connection (WebSocket, reconnecting)
//! - per-event enrichment tasks
//! - roster updates
//! - manual lookup by mint address
//!
//! The connection manager is an explicitly constructed, owned instance;
//! nothing here is a process-wide singleton, and the lifecycle is the
//! `new`/`run`/ctrl-c span of this struct.

use crate::config::AppConfig;
use crate::error::AppResult;
use mintwatch_core::TokenRecord;
use mintwatch_enrich::Enricher;
use mintwatch_roster::TokenRoster;
use mintwatch_ws::{ConnectionConfig, ConnectionManager, TokenEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// How long to wait for the feed task after requesting shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Main application.
pub struct Application {
    config: AppConfig,
    roster: Arc<TokenRoster>,
    enricher: Arc<Enricher>,
}

impl Application {
    /// Create a new application.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let roster = Arc::new(TokenRoster::new(config.roster_capacity));
        let enricher = Arc::new(Enricher::new(&config.enrich)?);

        Ok(Self {
            config,
            roster,
            enricher,
        })
    }

    /// Shared handle to the roster for the display layer.
    pub fn roster(&self) -> Arc<TokenRoster> {
        self.roster.clone()
    }

    /// Manual lookup by mint address.
    ///
    /// Validation errors and pipeline failures propagate; a resolved
    /// record is upserted into the roster and returned as the active
    /// selection. `Ok(None)` is the non-exceptional "not found" outcome.
    pub async fn lookup(&self, address: &str) -> AppResult<Option<TokenRecord>> {
        match self.enricher.fetch_by_mint(address).await? {
            Some(record) => {
                info!(mint = %record.mint, "Manual lookup resolved");
                self.roster.upsert(record.clone());
                Ok(Some(record))
            }
            None => {
                info!(mint = %address, "Manual lookup found nothing");
                Ok(None)
            }
        }
    }

    /// Run the application until ctrl-c.
    pub async fn run(self) -> AppResult<()> {
        info!(ws_url = %self.config.ws.url, "Starting application");

        // Raw token events from the feed
        let (event_tx, mut event_rx) = mpsc::channel::<TokenEvent>(1000);
        // Incremental enrichment updates headed for the roster
        let (update_tx, mut update_rx) = mpsc::channel::<TokenRecord>(1000);

        let ws_config: ConnectionConfig = self.config.ws.clone().into();
        let connection_manager = Arc::new(ConnectionManager::new(ws_config, event_tx));
        let mut state_watch = connection_manager.state_watch();

        // Spawn the feed connection task
        let manager_clone = connection_manager.clone();
        let ws_handle = tokio::spawn(async move {
            if let Err(e) = manager_clone.connect().await {
                error!(?e, "Feed connection failed");
            }
        });

        info!("Entering main event loop");
        let mut token_count = 0u64;

        loop {
            tokio::select! {
                // New raw token event: enrich in its own task. Enrichment
                // for different mints may overlap; updates apply as they
                // complete, which is safe because merges are keyed by mint.
                Some(event) = event_rx.recv() => {
                    token_count += 1;
                    info!(mint = %event.mint, "New token event (#{token_count})");

                    let enricher = self.enricher.clone();
                    let updates = update_tx.clone();
                    tokio::spawn(async move {
                        enricher.enrich(event.into_record(), &updates).await;
                    });
                }

                // Enrichment patch ready: merge into the roster
                Some(update) = update_rx.recv() => {
                    self.roster.upsert(update);
                }

                // Connection-state change: the user-visible indicator
                Ok(()) = state_watch.changed() => {
                    let state = *state_watch.borrow_and_update();
                    info!(%state, "Feed connection state");
                }

                // Handle shutdown signal
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        info!(token_count, "Shutting down");

        connection_manager.shutdown();
        if tokio::time::timeout(SHUTDOWN_GRACE, ws_handle).await.is_err() {
            warn!("Feed task did not stop in time, detaching");
        }

        Ok(())
    }
}
