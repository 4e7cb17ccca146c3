//! HTTP lookups for token enrichment.
//!
//! Three independent best-effort sources share one client:
//! - registry lookup by mint (name/symbol/supply/holders/market cap)
//! - off-chain metadata fetch against the URI embedded in a token
//! - launch-platform coin lookup (creator, description, links)
//!
//! Every method returns a patch `TokenRecord` carrying only the fields
//! the source supplied; the caller decides how failures degrade.

use crate::error::{EnrichError, EnrichResult};
use mintwatch_core::{CreatorInfo, TokenRecord};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Default timeout for enrichment requests.
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Registry response for a token lookup.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistryTokenResponse {
    name: Option<String>,
    symbol: Option<String>,
    supply: Option<f64>,
    holders: Option<u64>,
    market_cap_sol: Option<f64>,
    price: Option<f64>,
    created_at: Option<String>,
    uri: Option<String>,
    creator: Option<String>,
    website: Option<String>,
    twitter: Option<String>,
    description: Option<String>,
}

/// Off-chain metadata document fetched from a token's URI.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetadataResponse {
    image: Option<String>,
    name: Option<String>,
    symbol: Option<String>,
    description: Option<String>,
    website: Option<String>,
    twitter: Option<String>,
    creator: Option<String>,
    created_by: Option<String>,
}

/// Launch-platform coin document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlatformCoinResponse {
    name: Option<String>,
    symbol: Option<String>,
    image_uri: Option<String>,
    description: Option<String>,
    website: Option<String>,
    twitter: Option<String>,
    creator: Option<String>,
}

fn creator_info(
    creator: Option<String>,
    website: Option<String>,
    twitter: Option<String>,
    description: Option<String>,
) -> Option<CreatorInfo> {
    let info = CreatorInfo {
        creator,
        website,
        twitter,
        description,
    };
    if info.is_empty() {
        None
    } else {
        Some(info)
    }
}

/// Client for the secondary enrichment sources.
pub struct LookupClient {
    client: Client,
    registry_url: String,
    platform_url: String,
}

impl LookupClient {
    /// Create a new lookup client.
    ///
    /// # Arguments
    /// * `registry_url` - base URL of the holder/metadata registry
    /// * `platform_url` - base URL of the launch platform's coin API
    pub fn new(
        client: Client,
        registry_url: impl Into<String>,
        platform_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            registry_url: registry_url.into(),
            platform_url: platform_url.into(),
        }
    }

    /// Registry lookup by mint.
    ///
    /// Supplies name/symbol/supply/holder-count/market-cap and any creator
    /// links the registry knows about.
    pub async fn fetch_token(&self, mint: &str) -> EnrichResult<TokenRecord> {
        let url = format!("{}/tokens/{}", self.registry_url, mint);
        debug!(%url, "Fetching registry record");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| EnrichError::HttpClient(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichError::HttpClient(format!("HTTP {status}")));
        }

        let raw: RegistryTokenResponse = response
            .json()
            .await
            .map_err(|e| EnrichError::HttpClient(format!("Failed to parse response: {e}")))?;

        Ok(TokenRecord {
            name: raw.name,
            symbol: raw.symbol,
            supply: raw.supply,
            holders: raw.holders,
            market_cap_sol: raw.market_cap_sol,
            price: raw.price,
            created_at: raw.created_at,
            uri: raw.uri,
            creator_info: creator_info(raw.creator, raw.website, raw.twitter, raw.description),
            ..TokenRecord::new(mint)
        })
    }

    /// Off-chain metadata fetch against a token's URI.
    ///
    /// Supplies the image and possibly better display labels plus
    /// description/links.
    pub async fn fetch_metadata(&self, mint: &str, uri: &str) -> EnrichResult<TokenRecord> {
        debug!(%uri, "Fetching off-chain metadata");

        let response = self
            .client
            .get(uri)
            .send()
            .await
            .map_err(|e| EnrichError::HttpClient(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichError::HttpClient(format!("HTTP {status}")));
        }

        let raw: MetadataResponse = response
            .json()
            .await
            .map_err(|e| EnrichError::HttpClient(format!("Failed to parse metadata: {e}")))?;

        // Some documents carry `createdBy` instead of `creator`.
        let creator = raw.creator.or(raw.created_by);

        Ok(TokenRecord {
            image_url: raw.image,
            name: raw.name,
            symbol: raw.symbol,
            creator_info: creator_info(creator, raw.website, raw.twitter, raw.description),
            ..TokenRecord::new(mint)
        })
    }

    /// Launch-platform coin lookup by mint.
    ///
    /// Best-effort source for creator/description/links used by the manual
    /// lookup path.
    pub async fn fetch_platform_info(&self, mint: &str) -> EnrichResult<TokenRecord> {
        let url = format!("{}/coins/{}", self.platform_url, mint);
        debug!(%url, "Fetching platform coin info");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| EnrichError::HttpClient(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichError::HttpClient(format!("HTTP {status}")));
        }

        let raw: PlatformCoinResponse = response
            .json()
            .await
            .map_err(|e| EnrichError::HttpClient(format!("Failed to parse coin info: {e}")))?;

        Ok(TokenRecord {
            name: raw.name,
            symbol: raw.symbol,
            image_url: raw.image_uri,
            creator_info: creator_info(raw.creator, raw.website, raw.twitter, raw.description),
            ..TokenRecord::new(mint)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Client {
        Client::builder().timeout(DEFAULT_TIMEOUT).build().unwrap()
    }

    #[tokio::test]
    async fn test_fetch_token_maps_fields() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/tokens/MintA")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"name":"Foo","symbol":"FOO","supply":1000000.0,"holders":42,
                   "marketCapSol":30.5,"creator":"alice"}"#,
            )
            .create_async()
            .await;

        let lookup = LookupClient::new(client(), server.url(), server.url());
        let patch = lookup.fetch_token("MintA").await.unwrap();

        assert_eq!(patch.mint, "MintA");
        assert_eq!(patch.name.as_deref(), Some("Foo"));
        assert_eq!(patch.holders, Some(42));
        assert_eq!(patch.market_cap_sol, Some(30.5));
        assert_eq!(
            patch.creator_info.unwrap().creator.as_deref(),
            Some("alice")
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_token_non_success_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/tokens/MintA")
            .with_status(500)
            .create_async()
            .await;

        let lookup = LookupClient::new(client(), server.url(), server.url());
        assert!(lookup.fetch_token("MintA").await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_metadata_prefers_creator_over_created_by() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/meta.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"image":"https://img/x.png","createdBy":"bob"}"#)
            .create_async()
            .await;

        let lookup = LookupClient::new(client(), server.url(), server.url());
        let uri = format!("{}/meta.json", server.url());
        let patch = lookup.fetch_metadata("MintA", &uri).await.unwrap();

        assert_eq!(patch.image_url.as_deref(), Some("https://img/x.png"));
        assert_eq!(patch.creator_info.unwrap().creator.as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn test_empty_creator_fields_yield_no_creator_info() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/tokens/MintA")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name":"Foo"}"#)
            .create_async()
            .await;

        let lookup = LookupClient::new(client(), server.url(), server.url());
        let patch = lookup.fetch_token("MintA").await.unwrap();
        assert!(patch.creator_info.is_none());
    }
}
