//! The enrichment pipeline and manual lookup path.
//!
//! Steps run strictly in sequence and are independently fallible: a
//! failed step logs and contributes no fields, and never aborts the
//! remaining steps. Each completed step is dispatched as its own patch so
//! the roster can render partial data while later steps are in flight.

use crate::client::{LookupClient, DEFAULT_TIMEOUT};
use crate::error::{EnrichError, EnrichResult};
use crate::history::{HistoryMode, HistorySource};
use mintwatch_core::TokenRecord;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Base price used for the synthetic series when no source supplied one.
const DEFAULT_BASE_PRICE: f64 = 0.001;

/// Accepted mint address length range (loose base58 shape check).
const MIN_ADDRESS_LEN: usize = 32;
const MAX_ADDRESS_LEN: usize = 44;

/// Enrichment configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichConfig {
    /// Base URL of the holder/metadata registry.
    #[serde(default = "default_registry_url")]
    pub registry_url: String,
    /// Base URL of the price-history source.
    #[serde(default = "default_history_url")]
    pub history_url: String,
    /// Base URL of the launch platform's coin API.
    #[serde(default = "default_platform_url")]
    pub platform_url: String,
    /// Price-history capability (live or seeded synthetic).
    #[serde(default)]
    pub history: HistoryMode,
}

fn default_registry_url() -> String {
    "https://api.solscan.io".to_string()
}

fn default_history_url() -> String {
    "https://api.solscan.io".to_string()
}

fn default_platform_url() -> String {
    "https://frontend-api.pump.fun".to_string()
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            registry_url: default_registry_url(),
            history_url: default_history_url(),
            platform_url: default_platform_url(),
            history: HistoryMode::default(),
        }
    }
}

/// Best-effort token enricher.
///
/// Shared by the live feed path (one call per inbound event) and the
/// manual lookup path.
pub struct Enricher {
    client: LookupClient,
    history: HistorySource,
}

impl Enricher {
    /// Create a new enricher with one shared HTTP client.
    pub fn new(config: &EnrichConfig) -> EnrichResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| EnrichError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client: LookupClient::new(
                client.clone(),
                &config.registry_url,
                &config.platform_url,
            ),
            history: HistorySource::new(client, &config.history_url, config.history),
        })
    }

    /// Enrich a raw feed record, dispatching one patch per completed step.
    ///
    /// The seed record itself is the first update. Patches carry only the
    /// fields their step supplied; applying them in dispatch order gives
    /// later steps precedence for overlapping fields.
    pub async fn enrich(&self, seed: TokenRecord, updates: &mpsc::Sender<TokenRecord>) {
        let mint = seed.mint.clone();
        let mut current = seed.clone();

        if !send_update(updates, seed).await {
            return;
        }

        // Step 1: registry lookup
        match self.client.fetch_token(&mint).await {
            Ok(patch) => {
                current.merge(patch.clone());
                if !send_update(updates, patch).await {
                    return;
                }
            }
            Err(e) => warn!(%mint, error = %e, "Registry lookup failed"),
        }

        // Step 2: off-chain metadata, when a URI is known by now
        if let Some(uri) = current.uri.clone() {
            match self.client.fetch_metadata(&mint, &uri).await {
                Ok(patch) => {
                    current.merge(patch.clone());
                    if !send_update(updates, patch).await {
                        return;
                    }
                }
                Err(e) => warn!(%mint, error = %e, "Metadata fetch failed"),
            }
        }

        // Step 3: price history (degrades to the synthetic fallback)
        let base_price = current
            .price
            .or(current.initial_buy)
            .unwrap_or(DEFAULT_BASE_PRICE);
        let points = self.history.fetch(&mint, base_price).await;
        let patch = TokenRecord {
            price_history: Some(points),
            ..TokenRecord::new(&mint)
        };
        send_update(updates, patch).await;

        debug!(%mint, "Enrichment finished");
    }

    /// Manual lookup by mint address.
    ///
    /// Validates the address shape before any network call, then runs the
    /// pipeline steps plus the platform lookup. Returns `Ok(None)` when no
    /// step resolved a name or symbol ("not found", distinct from errors).
    pub async fn fetch_by_mint(&self, address: &str) -> EnrichResult<Option<TokenRecord>> {
        let address = address.trim();
        if address.is_empty() {
            return Err(EnrichError::InvalidAddress("address is empty".to_string()));
        }
        if address.len() < MIN_ADDRESS_LEN || address.len() > MAX_ADDRESS_LEN {
            return Err(EnrichError::InvalidAddress(format!(
                "address length {} outside {MIN_ADDRESS_LEN}..={MAX_ADDRESS_LEN}",
                address.len()
            )));
        }

        let mut record = TokenRecord::new(address);

        match self.client.fetch_token(address).await {
            Ok(patch) => record.merge(patch),
            Err(e) => warn!(mint = %address, error = %e, "Registry lookup failed"),
        }

        if let Some(uri) = record.uri.clone() {
            match self.client.fetch_metadata(address, &uri).await {
                Ok(patch) => record.merge(patch),
                Err(e) => warn!(mint = %address, error = %e, "Metadata fetch failed"),
            }
        }

        match self.client.fetch_platform_info(address).await {
            Ok(patch) => record.merge(patch),
            Err(e) => warn!(mint = %address, error = %e, "Platform lookup failed"),
        }

        let base_price = record
            .price
            .or(record.initial_buy)
            .unwrap_or(DEFAULT_BASE_PRICE);
        record.price_history = Some(self.history.fetch(address, base_price).await);

        if record.has_identity() {
            Ok(Some(record))
        } else {
            debug!(mint = %address, "Lookup resolved no identity, treating as not found");
            Ok(None)
        }
    }
}

/// Send one update, reporting whether the receiver is still attached.
async fn send_update(updates: &mpsc::Sender<TokenRecord>, patch: TokenRecord) -> bool {
    if updates.send(patch).await.is_err() {
        warn!("Token update receiver dropped");
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::SYNTHETIC_POINTS;

    /// 44-character mint address for validation-passing tests.
    const MINT: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

    fn enricher_for(server: &mockito::Server) -> Enricher {
        Enricher::new(&EnrichConfig {
            registry_url: server.url(),
            history_url: server.url(),
            platform_url: server.url(),
            history: HistoryMode::Live,
        })
        .unwrap()
    }

    async fn drain(mut rx: mpsc::Receiver<TokenRecord>) -> Vec<TokenRecord> {
        let mut updates = Vec::new();
        while let Some(update) = rx.recv().await {
            updates.push(update);
        }
        updates
    }

    #[tokio::test]
    async fn test_enrich_dispatches_one_update_per_step() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", format!("/tokens/{MINT}").as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name":"Foo","symbol":"FOO","holders":7}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/meta.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"image":"https://img/x.png"}"#)
            .create_async()
            .await;
        server
            .mock("GET", format!("/price-history/{MINT}").as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"time":1000,"price":0.5}]"#)
            .create_async()
            .await;

        let enricher = enricher_for(&server);
        let seed = TokenRecord {
            uri: Some(format!("{}/meta.json", server.url())),
            ..TokenRecord::new(MINT)
        };

        let (tx, rx) = mpsc::channel(16);
        enricher.enrich(seed, &tx).await;
        drop(tx);

        let updates = drain(rx).await;
        // seed + registry + metadata + history
        assert_eq!(updates.len(), 4);
        assert_eq!(updates[1].name.as_deref(), Some("Foo"));
        assert_eq!(updates[2].image_url.as_deref(), Some("https://img/x.png"));
        assert_eq!(updates[3].price_history.as_ref().unwrap().len(), 1);

        // Folding the updates in order yields the fully merged record.
        let mut merged = TokenRecord::new(MINT);
        for update in updates {
            merged.merge(update);
        }
        assert_eq!(merged.holders, Some(7));
        assert!(merged.image_url.is_some());
        assert!(merged.price_history.is_some());
    }

    #[tokio::test]
    async fn test_enrich_survives_failing_steps() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", format!("/tokens/{MINT}").as_str())
            .with_status(500)
            .create_async()
            .await;
        server
            .mock("GET", format!("/price-history/{MINT}").as_str())
            .with_status(500)
            .create_async()
            .await;

        let enricher = enricher_for(&server);
        let (tx, rx) = mpsc::channel(16);
        enricher.enrich(TokenRecord::new(MINT), &tx).await;
        drop(tx);

        let updates = drain(rx).await;
        // seed + history fallback; the failed registry step contributes nothing
        assert_eq!(updates.len(), 2);
        assert_eq!(
            updates[1].price_history.as_ref().unwrap().len(),
            SYNTHETIC_POINTS
        );
    }

    #[tokio::test]
    async fn test_fetch_by_mint_rejects_before_any_network_call() {
        let mut server = mockito::Server::new_async().await;
        let registry = server
            .mock("GET", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let enricher = enricher_for(&server);

        assert!(matches!(
            enricher.fetch_by_mint("").await,
            Err(EnrichError::InvalidAddress(_))
        ));
        assert!(matches!(
            enricher.fetch_by_mint("   ").await,
            Err(EnrichError::InvalidAddress(_))
        ));
        assert!(matches!(
            enricher.fetch_by_mint("short").await,
            Err(EnrichError::InvalidAddress(_))
        ));
        assert!(matches!(
            enricher.fetch_by_mint(&"A".repeat(45)).await,
            Err(EnrichError::InvalidAddress(_))
        ));

        registry.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_by_mint_not_found_when_all_steps_fail() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let enricher = enricher_for(&server);
        let result = enricher.fetch_by_mint(MINT).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_fetch_by_mint_found_with_platform_identity() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", format!("/tokens/{MINT}").as_str())
            .with_status(404)
            .create_async()
            .await;
        server
            .mock("GET", format!("/coins/{MINT}").as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name":"Foo","symbol":"FOO","creator":"alice"}"#)
            .create_async()
            .await;
        server
            .mock("GET", format!("/price-history/{MINT}").as_str())
            .with_status(500)
            .create_async()
            .await;

        let enricher = enricher_for(&server);
        let record = enricher.fetch_by_mint(MINT).await.unwrap().unwrap();

        assert_eq!(record.name.as_deref(), Some("Foo"));
        assert_eq!(
            record.creator_info.unwrap().creator.as_deref(),
            Some("alice")
        );
        // History always materializes, via fallback here.
        assert_eq!(
            record.price_history.unwrap().len(),
            SYNTHETIC_POINTS
        );
    }
}
