//! Cross-fund aggregation for the holdings analysis.
//!
//! Collapses cleaned per-fund holdings into per-company statistics. All
//! maps are ordered so reports come out byte-identical run to run.

use std::collections::{BTreeMap, BTreeSet};

use super::processor::ProcessedFund;

/// Aggregated statistics for one company across funds.
#[derive(Debug, Clone, Default)]
pub struct CompanyStats {
    /// Distinct funds holding the company. A fund never counts twice, even
    /// when it discloses the company on several rows.
    pub fund_count: usize,
    /// Exact sum of every disclosed weight row.
    pub total_weight: f64,
    /// First distinct fund names seen, capped.
    pub sample_funds: Vec<String>,
}

impl CompanyStats {
    /// Average weight per holding fund.
    pub fn avg_weight(&self) -> f64 {
        if self.fund_count == 0 {
            return 0.0;
        }
        self.total_weight / self.fund_count as f64
    }
}

/// Per-fund summary carried into the report.
#[derive(Debug, Clone)]
pub struct FundSummary {
    pub name: String,
    pub aum: String,
    pub holdings_count: usize,
}

/// Everything the report builder needs, in deterministic order.
#[derive(Debug, Default)]
pub struct AggregatedHoldings {
    /// Company statistics keyed by normalized name.
    pub companies: BTreeMap<String, CompanyStats>,
    /// Fund summaries keyed by fund name. Duplicate-named funds collapse,
    /// last one wins.
    pub funds: BTreeMap<String, FundSummary>,
    /// Documents that produced usable holdings.
    pub total_files: usize,
}

/// Aggregate cleaned funds into per-company statistics.
///
/// `max_sample_funds` caps `sample_funds` per company; entries are
/// deduplicated, so one fund appears at most once per company.
pub fn aggregate(funds: &[ProcessedFund], max_sample_funds: usize) -> AggregatedHoldings {
    let mut companies: BTreeMap<String, CompanyStats> = BTreeMap::new();
    let mut seen: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut fund_summaries: BTreeMap<String, FundSummary> = BTreeMap::new();

    for fund in funds {
        fund_summaries.insert(
            fund.name.clone(),
            FundSummary {
                name: fund.name.clone(),
                aum: fund.aum.clone(),
                holdings_count: fund.holdings.len(),
            },
        );

        for holding in &fund.holdings {
            let stats = companies.entry(holding.company.clone()).or_default();
            stats.total_weight += holding.weight;

            let fund_set = seen.entry(holding.company.clone()).or_default();
            if fund_set.insert(fund.name.clone()) {
                stats.fund_count += 1;
                if stats.sample_funds.len() < max_sample_funds {
                    stats.sample_funds.push(fund.name.clone());
                }
            }
        }
    }

    AggregatedHoldings {
        companies,
        funds: fund_summaries,
        total_files: funds.len(),
    }
}

// ============================================================================
// Tests
// ============================================================================
