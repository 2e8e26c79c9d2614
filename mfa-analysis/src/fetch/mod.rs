//! Document fetching for the analysis pipeline.
//!
//! Defines the `DocumentFetcher` trait that all disclosure sources
//! implement, so the orchestrator never cares where a document came from.
//! The bundled implementation talks to the Coin public JSON APIs; browser
//! automation lives outside this crate.

mod coin;
mod pacer;

pub use coin::CoinApiFetcher;
pub use pacer::{shared_pacer, FetchPacer, SharedFetchPacer};

use async_trait::async_trait;
use thiserror::Error;

use crate::document::FundDocument;

// ============================================================================
// Fetch Error
// ============================================================================

/// Errors specific to document fetching.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL does not carry a recognizable fund identifier.
    #[error("Invalid fund URL: {0}")]
    InvalidUrl(String),

    /// Transport-level failure (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered but refused or returned an error payload.
    #[error("API error: {0}")]
    Api(String),

    /// The response body could not be interpreted.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl FetchError {
    /// Whether a retry of the same request could plausibly succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| s.is_server_error())
            }
            Self::Api(_) | Self::Decode(_) | Self::InvalidUrl(_) => false,
        }
    }
}

// ============================================================================
// Document Fetcher Trait
// ============================================================================

/// Trait for fund-disclosure sources.
///
/// Implementations fetch one document per URL. Failures are per-URL; the
/// caller decides whether to skip or abort.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Source name recorded as the document provider (e.g. "coin-api").
    fn name(&self) -> &'static str;

    /// Fetch and decode the disclosure behind one fund URL.
    async fn fetch_document(&self, url: &str) -> Result<FundDocument, FetchError>;
}
