//! Token record types and merge semantics.
//!
//! A `TokenRecord` is keyed by its mint address and accumulates fields as
//! enrichment steps complete. Updates are applied as shallow, field-level
//! merges: a patch only overwrites the fields it defines.

use serde::{Deserialize, Serialize};

/// A single price sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Sample time as unix milliseconds.
    pub timestamp: i64,
    /// Price at that time.
    pub price: f64,
}

/// Off-chain creator metadata attached to a token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatorInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CreatorInfo {
    /// Check whether any field is populated.
    pub fn is_empty(&self) -> bool {
        self.creator.is_none()
            && self.website.is_none()
            && self.twitter.is_none()
            && self.description.is_none()
    }
}

/// One token record per distinct mint identifier.
///
/// All fields except `mint` are optional and absent until some source
/// supplies them. Wire names are camelCase to match the upstream feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    /// Stable unique identifier, primary key.
    pub mint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_buy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap_sol: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supply: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holders: Option<u64>,
    /// Origination timestamp as supplied upstream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Off-chain metadata pointer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Chronologically ascending price samples.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_history: Option<Vec<PricePoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_info: Option<CreatorInfo>,
}

impl TokenRecord {
    /// Create an empty record for a mint.
    pub fn new(mint: impl Into<String>) -> Self {
        Self {
            mint: mint.into(),
            ..Default::default()
        }
    }

    /// Check whether the record carries a display identity.
    ///
    /// A record counts as resolved once any source supplied a name or a
    /// symbol; everything else is decoration.
    pub fn has_identity(&self) -> bool {
        self.name.is_some() || self.symbol.is_some()
    }

    /// Apply a shallow, field-level merge.
    ///
    /// Fields defined in `patch` overwrite; fields absent in `patch`
    /// preserve their current value. Nested structures (`creator_info`,
    /// `price_history`) replace wholesale when the patch defines them.
    pub fn merge(&mut self, patch: TokenRecord) {
        if patch.name.is_some() {
            self.name = patch.name;
        }
        if patch.symbol.is_some() {
            self.symbol = patch.symbol;
        }
        if patch.price.is_some() {
            self.price = patch.price;
        }
        if patch.initial_buy.is_some() {
            self.initial_buy = patch.initial_buy;
        }
        if patch.market_cap_sol.is_some() {
            self.market_cap_sol = patch.market_cap_sol;
        }
        if patch.supply.is_some() {
            self.supply = patch.supply;
        }
        if patch.holders.is_some() {
            self.holders = patch.holders;
        }
        if patch.created_at.is_some() {
            self.created_at = patch.created_at;
        }
        if patch.uri.is_some() {
            self.uri = patch.uri;
        }
        if patch.image_url.is_some() {
            self.image_url = patch.image_url;
        }
        if patch.price_history.is_some() {
            self.price_history = patch.price_history;
        }
        if patch.creator_info.is_some() {
            self.creator_info = patch.creator_info;
        }
    }

    /// Merge by value, returning the combined record.
    pub fn merged(mut self, patch: TokenRecord) -> Self {
        self.merge(patch);
        self
    }
}
