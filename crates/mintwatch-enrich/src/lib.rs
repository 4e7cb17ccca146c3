//! Token enrichment for the mintwatch scanner.
//!
//! Given a raw feed event, runs a best-effort, independently-fallible
//! sequence of lookups (registry, off-chain metadata, price history) and
//! emits one patch per completed step, so the roster can show partial
//! data before enrichment finishes. Also hosts the manual lookup path
//! used for on-demand fetches by mint address.

pub mod client;
pub mod error;
pub mod history;
pub mod pipeline;

pub use client::LookupClient;
pub use error::{EnrichError, EnrichResult};
pub use history::{synthetic_series, HistoryMode, HistorySource, SYNTHETIC_POINTS};
pub use pipeline::{EnrichConfig, Enricher};
