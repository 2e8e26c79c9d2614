//! Per-document cleanup for the holdings analysis.
//!
//! Raw disclosures carry legal suffixes, percentage strings and the odd
//! empty row. This pass normalizes names, applies the exclusion list and
//! parses weights so the aggregator only ever sees clean rows.

use tracing::debug;

use crate::document::FundDocument;
use crate::normalize::{normalize_company_name, parse_percentage, ExclusionList};

/// One cleaned holding row.
#[derive(Debug, Clone)]
pub struct ProcessedHolding {
    /// Normalized company name.
    pub company: String,
    /// Allocation weight in percent.
    pub weight: f64,
    /// Disclosure rank as scraped.
    pub rank: u32,
}

/// A fund whose holdings survived cleaning.
#[derive(Debug, Clone)]
pub struct ProcessedFund {
    pub name: String,
    pub aum: String,
    pub holdings: Vec<ProcessedHolding>,
}

/// Cleans fetched documents for holdings aggregation.
#[derive(Debug)]
pub struct HoldingsProcessor {
    exclusions: ExclusionList,
}

impl HoldingsProcessor {
    pub fn new(exclude_from_analysis: &[String]) -> Self {
        Self {
            exclusions: ExclusionList::new(exclude_from_analysis),
        }
    }

    /// Clean one document.
    ///
    /// `fallback_label` stands in for a blank fund name, so funds stay
    /// distinguishable in reports; callers pass the source URL. Returns
    /// `None` when nothing usable remains, which callers treat as a skip
    /// rather than a failure.
    pub fn process(&self, document: &FundDocument, fallback_label: &str) -> Option<ProcessedFund> {
        let info = &document.data.fund_info;

        let name = if info.fund_name.trim().is_empty() {
            fallback_label.to_string()
        } else {
            info.fund_name.trim().to_string()
        };

        let aum = if info.aum.trim().is_empty() {
            "N/A".to_string()
        } else {
            info.aum.trim().to_string()
        };

        let mut holdings = Vec::new();
        for raw in &document.data.top_holdings {
            let company = normalize_company_name(&raw.company_name);
            if company.is_empty() {
                continue;
            }
            if self.exclusions.is_excluded(&company) {
                continue;
            }

            let weight = parse_percentage(&raw.allocation_percentage);
            if weight <= 0.0 {
                continue;
            }

            holdings.push(ProcessedHolding {
                company,
                weight,
                rank: raw.rank,
            });
        }

        if holdings.is_empty() {
            debug!(fund = %name, "No usable holdings after cleaning, skipping fund");
            return None;
        }

        Some(ProcessedFund {
            name,
            aum,
            holdings,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
