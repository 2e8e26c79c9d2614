//! Scraped fund-disclosure document model.
//!
//! This is the wire shape produced by the fetchers and consumed by every
//! analyzer. Fields deserialize leniently: a partial or sloppy document
//! should load and be judged by the processors, not abort a whole run at
//! the serde boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current schema version written into new documents.
pub const SCHEMA_VERSION: &str = "1.0";

/// A fetched fund disclosure: provenance plus the extracted data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundDocument {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    #[serde(default = "Utc::now")]
    pub extraction_timestamp: DateTime<Utc>,

    #[serde(default)]
    pub source_url: String,

    /// Which fetcher produced this document (e.g. "coin-api").
    #[serde(default)]
    pub provider: String,

    #[serde(default)]
    pub data: FundData,
}

fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

/// Extracted payload: fund metadata plus its disclosed top holdings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FundData {
    #[serde(default)]
    pub fund_info: FundInfo,

    #[serde(default)]
    pub top_holdings: Vec<RawHolding>,
}

/// Fund metadata as scraped. Everything is free text; the processors parse
/// what they need (`current_nav`, `aum`) with the lenient parsers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FundInfo {
    #[serde(default)]
    pub fund_name: String,
    #[serde(default)]
    pub current_nav: String,
    #[serde(default)]
    pub cagr: String,
    #[serde(default)]
    pub expense_ratio: String,
    #[serde(default)]
    pub aum: String,
    #[serde(default)]
    pub fund_manager: String,
    #[serde(default)]
    pub launch_date: String,
    #[serde(default)]
    pub risk_level: String,
}

/// One disclosed holding row, as scraped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawHolding {
    #[serde(default)]
    pub rank: u32,

    #[serde(default)]
    pub company_name: String,

    /// Allocation as text, e.g. "8.50%".
    #[serde(default)]
    pub allocation_percentage: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
}

impl FundDocument {
    /// Build a fresh document for data extracted right now.
    pub fn new(source_url: impl Into<String>, provider: impl Into<String>, data: FundData) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            extraction_timestamp: Utc::now(),
            source_url: source_url.into(),
            provider: provider.into(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_document_loads() {
        let json = r#"{
            "source_url": "https://example.com/mf/fund/INF1/alpha",
            "data": {
                "fund_info": { "fund_name": "Alpha Fund" },
                "top_holdings": [
                    { "company_name": "Reliance Industries Ltd", "allocation_percentage": "8.5%" },
                    { "rank": 2, "company_name": "TCS Ltd" }
                ]
            }
        }"#;

        let doc: FundDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.schema_version, SCHEMA_VERSION);
        assert_eq!(doc.data.fund_info.fund_name, "Alpha Fund");
        assert_eq!(doc.data.top_holdings.len(), 2);
        assert_eq!(doc.data.top_holdings[0].rank, 0);
        assert_eq!(doc.data.top_holdings[1].allocation_percentage, "");
        assert_eq!(doc.data.fund_info.aum, "");
    }

    #[test]
    fn test_empty_object_loads() {
        let doc: FundDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.data.top_holdings.is_empty());
        assert_eq!(doc.provider, "");
    }

    #[test]
    fn test_sector_omitted_when_absent() {
        let doc = FundDocument::new("https://x/fund/A/a", "coin-api", FundData::default());
        let json = serde_json::to_string(&doc).unwrap();
        assert!(!json.contains("sector"));
        assert!(json.contains("\"schema_version\":\"1.0\""));
    }
}
