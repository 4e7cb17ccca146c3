//! Wire message types for the token feed.
//!
//! Outbound: the one-shot new-token subscription and the keep-alive ping.
//! Inbound: new-token events, accepted in either of the two shapes the
//! provider emits — `{"method": "newToken", "params": [tokenInfo]}` or a
//! flat object carrying both `signature` and `mint`.

use crate::error::WsResult;
use mintwatch_core::TokenRecord;
use serde::{Deserialize, Serialize};

/// Subscription request sent once after connect.
#[derive(Debug, Clone, Serialize)]
pub struct SubscribeRequest {
    method: String,
    params: Vec<serde_json::Value>,
}

impl SubscribeRequest {
    /// Subscribe to new-token events.
    pub fn new_token() -> Self {
        Self {
            method: "subscribeNewToken".to_string(),
            params: Vec::new(),
        }
    }
}

/// Application-level keep-alive ping.
#[derive(Debug, Clone, Serialize)]
pub struct PingMessage {
    #[serde(rename = "type")]
    kind: String,
}

impl PingMessage {
    pub fn new() -> Self {
        Self {
            kind: "ping".to_string(),
        }
    }
}

impl Default for PingMessage {
    fn default() -> Self {
        Self::new()
    }
}

/// A raw new-token event decoded from the feed.
///
/// Carries whatever partial fields the provider included; `mint` is the
/// only required field. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenEvent {
    pub mint: String,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub initial_buy: Option<f64>,
    #[serde(default)]
    pub market_cap_sol: Option<f64>,
    #[serde(default)]
    pub supply: Option<f64>,
    #[serde(default)]
    pub holders: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl TokenEvent {
    /// Convert into a seed `TokenRecord` for the enrichment pipeline.
    pub fn into_record(self) -> TokenRecord {
        TokenRecord {
            mint: self.mint,
            name: self.name,
            symbol: self.symbol,
            uri: self.uri,
            price: self.price,
            initial_buy: self.initial_buy,
            market_cap_sol: self.market_cap_sol,
            supply: self.supply,
            holders: self.holders,
            created_at: self.created_at,
            ..Default::default()
        }
    }
}

/// Decode one inbound text frame.
///
/// Returns `Ok(Some(event))` for either accepted new-token shape,
/// `Ok(None)` for any other well-formed message (silently ignored by the
/// caller), and `Err` for payloads that fail to parse.
pub fn parse_feed_message(text: &str) -> WsResult<Option<TokenEvent>> {
    let value: serde_json::Value = serde_json::from_str(text)?;

    // Shape 1: {"method": "newToken", "params": [tokenInfo]}
    let is_new_token = value
        .get("method")
        .and_then(|m| m.as_str())
        .is_some_and(|m| m == "newToken");
    if is_new_token {
        if let Some(info) = value.get("params").and_then(|p| p.get(0)) {
            let event: TokenEvent = serde_json::from_value(info.clone())?;
            return Ok(Some(event));
        }
        return Ok(None);
    }

    // Shape 2: flat object with both signature and mint.
    if value.get("signature").is_some() && value.get("mint").is_some() {
        let event: TokenEvent = serde_json::from_value(value)?;
        return Ok(Some(event));
    }

    Ok(None)
}
