//! Price-history source with an explicit live/synthetic capability.
//!
//! The live variant fetches an ordered `(time, price)` series by mint;
//! when the upstream yields nothing (empty body, error, or no data) a
//! deterministic fallback generator synthesizes a 24-point hourly series
//! anchored to the current time. The synthetic variant skips the network
//! entirely and draws from a fixed seed, so tests get repeatable series.

use chrono::Utc;
use mintwatch_core::PricePoint;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Number of points in a synthesized series (one per hour).
pub const SYNTHETIC_POINTS: usize = 24;

const HOUR_MS: i64 = 3_600_000;

/// Jitter bounds for the synthetic series.
const JITTER_MIN: f64 = 0.8;
const JITTER_MAX: f64 = 1.2;

/// How price history is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum HistoryMode {
    /// Fetch from the upstream source, synthesizing only when it has no data.
    Live,
    /// Always synthesize from a fixed seed.
    Synthetic { seed: u64 },
}

impl Default for HistoryMode {
    fn default() -> Self {
        Self::Live
    }
}

/// Raw sample from the upstream source.
///
/// The upstream is inconsistent about the key name, so both `time` and
/// `timestamp` are accepted.
#[derive(Debug, Deserialize)]
struct RawPricePoint {
    #[serde(default)]
    time: Option<i64>,
    #[serde(default)]
    timestamp: Option<i64>,
    price: f64,
}

/// Price-history source.
pub struct HistorySource {
    client: Client,
    base_url: String,
    mode: HistoryMode,
}

impl HistorySource {
    /// Create a new history source.
    pub fn new(client: Client, base_url: impl Into<String>, mode: HistoryMode) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            mode,
        }
    }

    /// Fetch the price history for a mint.
    ///
    /// Infallible by design: upstream failure or absence of data degrades
    /// to the synthetic fallback, logged at `warn`/`debug`.
    pub async fn fetch(&self, mint: &str, base_price: f64) -> Vec<PricePoint> {
        if let HistoryMode::Synthetic { seed } = self.mode {
            return synthetic_series(
                base_price,
                Utc::now().timestamp_millis(),
                StdRng::seed_from_u64(seed),
            );
        }

        match self.fetch_live(mint).await {
            Ok(points) if !points.is_empty() => points,
            Ok(_) => {
                debug!(%mint, "Price source returned no data, synthesizing");
                self.synthesize(base_price)
            }
            Err(e) => {
                warn!(%mint, error = %e, "Price history fetch failed, synthesizing");
                self.synthesize(base_price)
            }
        }
    }

    async fn fetch_live(&self, mint: &str) -> Result<Vec<PricePoint>, String> {
        let url = format!("{}/price-history/{}", self.base_url, mint);
        debug!(%url, "Fetching price history");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("HTTP request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {status}"));
        }

        let raw: Vec<RawPricePoint> = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse price history: {e}"))?;

        let points = raw
            .into_iter()
            .filter_map(|p| {
                let timestamp = p.time.or(p.timestamp)?;
                Some(PricePoint {
                    timestamp,
                    price: p.price,
                })
            })
            .collect();

        Ok(points)
    }

    fn synthesize(&self, base_price: f64) -> Vec<PricePoint> {
        synthetic_series(
            base_price,
            Utc::now().timestamp_millis(),
            StdRng::from_entropy(),
        )
    }
}

/// Generate a synthetic hourly series ending at `anchor_ms`.
///
/// Produces exactly `SYNTHETIC_POINTS` samples with strictly increasing
/// timestamps spaced one hour apart. Each price is the ramped base value
/// `base_price * (1 + i/points)` scaled by a jitter in [0.8, 1.2].
pub fn synthetic_series(base_price: f64, anchor_ms: i64, mut rng: impl Rng) -> Vec<PricePoint> {
    let start = anchor_ms - SYNTHETIC_POINTS as i64 * HOUR_MS;

    (0..SYNTHETIC_POINTS)
        .map(|i| {
            let timestamp = start + i as i64 * HOUR_MS;
            let jitter = rng.gen_range(JITTER_MIN..=JITTER_MAX);
            let ramp = 1.0 + i as f64 / SYNTHETIC_POINTS as f64;
            PricePoint {
                timestamp,
                price: base_price * ramp * jitter,
            }
        })
        .collect()
}
