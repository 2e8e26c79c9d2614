//! Coin public API fetcher for mutual fund disclosures.
//!
//! Fund pages embed everything this pipeline needs behind two static JSON
//! endpoints keyed by the ISIN-style fund id in the page URL:
//!
//! - `scheme-portfolio/{id}.json` - full disclosed portfolio, one positional
//!   array per instrument
//! - `historical-nav/{id}.json` - NAV history as `[date, nav]` pairs
//!
//! Portfolio rows drive the holdings extraction; the NAV history supplies
//! `current_nav` and is best-effort, a fund with holdings but no readable
//! NAV still produces a document.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use mfa_common::FetchConfig;

use super::pacer::{shared_pacer, SharedFetchPacer};
use super::{DocumentFetcher, FetchError};
use crate::document::{FundData, FundDocument, FundInfo, RawHolding};

// ============================================================================
// Constants
// ============================================================================

/// Portfolio disclosure endpoint base (fund id appended as `{id}.json`).
const PORTFOLIO_API_BASE: &str = "https://staticassets.zerodha.com/coin/scheme-portfolio";

/// NAV history endpoint base (fund id appended as `{id}.json`).
const NAV_API_BASE: &str = "https://staticassets.zerodha.com/coin/historical-nav";

/// Provider name stamped into every produced document.
const PROVIDER_NAME: &str = "coin-api";

/// Status value the API returns on success.
const SUCCESS_STATUS: &str = "success";

/// Asset type of rows kept as holdings. Debt, cash and derivative rows are
/// dropped.
const EQUITY_ASSET_TYPE: &str = "Equity";

/// Minimum field count of a usable portfolio row.
const MIN_HOLDING_FIELDS: usize = 8;

/// Positional indices within a portfolio row.
const IDX_COMPANY: usize = 1;
const IDX_SECTOR: usize = 2;
const IDX_ASSET_TYPE: usize = 3;
const IDX_PERCENTAGE: usize = 5;

/// HTTP statuses worth retrying.
const RETRYABLE_STATUS: [u16; 4] = [500, 502, 503, 504];

// ============================================================================
// URL Parsing
// ============================================================================

/// Fund id segment of a disclosure page URL, e.g.
/// `https://coin.zerodha.com/mf/fund/INF174K01LS9/alpha-flexi-cap-direct-growth`.
static FUND_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/fund/([A-Z0-9]+)/").expect("static pattern"));

/// Name slug that follows the fund id.
static FUND_SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/fund/[A-Z0-9]+/([^/?#]+)").expect("static pattern"));

/// Extract the fund id from a disclosure page URL.
fn extract_fund_id(url: &str) -> Option<&str> {
    FUND_ID_RE
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Derive a display name from the URL slug.
///
/// `alpha-flexi-cap-direct-growth` becomes `Alpha Flexi Cap`; the plan
/// suffix is part of the URL, not the fund name.
fn fund_name_from_url(url: &str) -> String {
    let slug = FUND_SLUG_RE
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or("");

    let mut words: Vec<String> = slug
        .split('-')
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect();

    if words.len() >= 2 {
        let tail = format!("{} {}", words[words.len() - 2], words[words.len() - 1]);
        if tail.eq_ignore_ascii_case("direct growth") {
            words.truncate(words.len() - 2);
        }
    }

    words.join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

// ============================================================================
// Row Parsing
// ============================================================================

fn field_str(fields: &[serde_json::Value], idx: usize) -> &str {
    fields.get(idx).and_then(|v| v.as_str()).unwrap_or("")
}

/// Numeric field that may arrive as a JSON number or a numeric string.
fn field_f64(fields: &[serde_json::Value], idx: usize) -> f64 {
    match fields.get(idx) {
        Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Turn raw portfolio rows into ranked equity holdings.
///
/// Rows that are too short, non-equity, or nameless are skipped. Survivors
/// are re-ranked from 1 in disclosure order. A `max_holdings` of zero means
/// no cap.
fn parse_holdings(rows: &[serde_json::Value], max_holdings: usize) -> Vec<RawHolding> {
    let mut holdings = Vec::new();

    for row in rows {
        let Some(fields) = row.as_array() else {
            continue;
        };
        if fields.len() < MIN_HOLDING_FIELDS {
            continue;
        }

        let company = field_str(fields, IDX_COMPANY).trim();
        let asset_type = field_str(fields, IDX_ASSET_TYPE);
        if asset_type != EQUITY_ASSET_TYPE || company.is_empty() {
            continue;
        }

        let sector = field_str(fields, IDX_SECTOR).trim();
        let percentage = field_f64(fields, IDX_PERCENTAGE);

        holdings.push(RawHolding {
            rank: holdings.len() as u32 + 1,
            company_name: company.to_string(),
            allocation_percentage: format!("{}%", percentage),
            sector: (!sector.is_empty()).then(|| sector.to_string()),
        });

        if max_holdings > 0 && holdings.len() >= max_holdings {
            break;
        }
    }

    holdings
}

// ============================================================================
// Coin API Fetcher
// ============================================================================

/// Fetcher backed by the Coin public JSON endpoints.
///
/// Requests are paced, retried on transient failures, and sent with the
/// configured User-Agent. One instance per analysis run is cheap; share the
/// pacer when several runs overlap.
pub struct CoinApiFetcher {
    /// HTTP client
    client: reqwest::Client,
    /// Pacer applied before every outbound request
    pacer: SharedFetchPacer,
    /// Holdings kept per fund (0 = unlimited)
    max_holdings: usize,
    /// Attempts per request, counting the first
    max_retries: u32,
    /// Base backoff, multiplied by the attempt number
    retry_backoff_ms: u64,
    /// Portfolio endpoint base, overridable for tests
    portfolio_base: String,
    /// NAV endpoint base, overridable for tests
    nav_base: String,
}

impl CoinApiFetcher {
    /// Create a fetcher from fetch configuration.
    pub fn from_config(config: &FetchConfig, max_holdings: usize) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            pacer: shared_pacer(PROVIDER_NAME, config.delay_between_requests_ms),
            max_holdings,
            max_retries: config.max_retries,
            retry_backoff_ms: config.retry_backoff_ms,
            portfolio_base: PORTFOLIO_API_BASE.to_string(),
            nav_base: NAV_API_BASE.to_string(),
        }
    }

    /// Share a pacer with other fetcher instances.
    pub fn with_pacer(mut self, pacer: SharedFetchPacer) -> Self {
        self.pacer = Arc::clone(&pacer);
        self
    }

    /// Point the fetcher at alternate endpoints. Used by tests and mirrors.
    pub fn with_base_urls(
        mut self,
        portfolio_base: impl Into<String>,
        nav_base: impl Into<String>,
    ) -> Self {
        self.portfolio_base = portfolio_base.into();
        self.nav_base = nav_base.into();
        self
    }

    /// GET a Coin endpoint with pacing and retries, returning the decoded
    /// envelope once the API reports success.
    async fn get_envelope(&self, url: &str) -> Result<ApiEnvelope, FetchError> {
        let attempts = self.max_retries.max(1);
        let mut last_err = None;

        for attempt in 1..=attempts {
            self.pacer.wait_turn().await;

            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if RETRYABLE_STATUS.contains(&status.as_u16()) {
                        debug!(url = %url, status = %status, attempt, "Retryable status from Coin API");
                        last_err = Some(FetchError::Api(format!("HTTP {} from {}", status, url)));
                    } else if !status.is_success() {
                        return Err(FetchError::Api(format!("HTTP {} from {}", status, url)));
                    } else {
                        let envelope: ApiEnvelope = response
                            .json()
                            .await
                            .map_err(|e| FetchError::Decode(format!("{}: {}", url, e)))?;

                        if envelope.status != SUCCESS_STATUS {
                            return Err(FetchError::Api(format!(
                                "status={} from {}",
                                envelope.status, url
                            )));
                        }
                        return Ok(envelope);
                    }
                }
                Err(e) => {
                    let err = FetchError::Http(e);
                    if !err.is_recoverable() {
                        return Err(err);
                    }
                    last_err = Some(err);
                }
            }

            if attempt < attempts {
                let backoff = Duration::from_millis(self.retry_backoff_ms * u64::from(attempt));
                debug!(url = %url, attempt, backoff_ms = backoff.as_millis() as u64, "Backing off before retry");
                tokio::time::sleep(backoff).await;
            }
        }

        Err(last_err.unwrap_or_else(|| FetchError::Api(format!("retries exhausted for {}", url))))
    }

    /// Latest NAV from the history endpoint: the second field of the final
    /// `[date, nav]` entry.
    async fn fetch_latest_nav(&self, url: &str) -> Result<f64, FetchError> {
        let envelope = self.get_envelope(url).await?;

        let last = envelope
            .data
            .last()
            .ok_or_else(|| FetchError::Decode(format!("empty NAV history from {}", url)))?;

        let row = last
            .as_array()
            .filter(|r| r.len() >= 2)
            .ok_or_else(|| FetchError::Decode(format!("malformed NAV entry from {}", url)))?;

        row[1]
            .as_f64()
            .or_else(|| row[1].as_str().and_then(|s| s.trim().parse().ok()))
            .ok_or_else(|| FetchError::Decode(format!("non-numeric NAV from {}", url)))
    }
}

#[async_trait]
impl DocumentFetcher for CoinApiFetcher {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn fetch_document(&self, url: &str) -> Result<FundDocument, FetchError> {
        let fund_id = extract_fund_id(url)
            .ok_or_else(|| FetchError::InvalidUrl(url.to_string()))?
            .to_string();

        let portfolio_url = format!("{}/{}.json", self.portfolio_base, fund_id);
        let envelope = self.get_envelope(&portfolio_url).await?;
        let top_holdings = parse_holdings(&envelope.data, self.max_holdings);

        let nav_url = format!("{}/{}.json", self.nav_base, fund_id);
        let current_nav = match self.fetch_latest_nav(&nav_url).await {
            Ok(nav) => nav.to_string(),
            Err(e) => {
                warn!(fund_id = %fund_id, error = %e, "NAV lookup failed, continuing without it");
                String::new()
            }
        };

        debug!(
            fund_id = %fund_id,
            holdings = top_holdings.len(),
            nav = %current_nav,
            "Fetched fund disclosure"
        );

        let fund_info = FundInfo {
            fund_name: fund_name_from_url(url),
            current_nav,
            ..FundInfo::default()
        };

        Ok(FundDocument::new(
            url,
            PROVIDER_NAME,
            FundData {
                fund_info,
                top_holdings,
            },
        ))
    }
}

// ============================================================================
// API Response Types
// ============================================================================

/// Envelope both Coin endpoints share.
///
/// `data` rows are positional arrays whose layout differs per endpoint, so
/// they stay as raw values until parsed.
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    #[serde(default)]
    status: String,
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

// ============================================================================
// Tests
// ============================================================================
