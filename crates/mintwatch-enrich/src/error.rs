//! Enrichment error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Invalid mint address: {0}")]
    InvalidAddress(String),
}

pub type EnrichResult<T> = Result<T, EnrichError>;
