//! Report shape for the holdings analysis.
//!
//! Field names and ordering rules are a compatibility contract with the
//! persisted report consumers; change them and every downstream chart
//! breaks. Sorting happens on raw weights, rounding only at the edge.

use serde::Serialize;

use mfa_common::Result;

use super::aggregator::AggregatedHoldings;
use crate::analysis::{round2, round3};

/// Fund reference inside the report.
#[derive(Debug, Serialize)]
struct FundEntry {
    name: String,
    aum: String,
}

/// Ranked company entry. `name` and `company` deliberately carry the same
/// value; existing readers key on either.
#[derive(Debug, Clone, Serialize)]
struct CompanyEntry {
    name: String,
    company: String,
    fund_count: usize,
    total_weight: f64,
    avg_weight: f64,
    sample_funds: Vec<String>,
}

/// Company held by every fund. Same shape minus the samples, which would
/// just repeat the full fund list.
#[derive(Debug, Serialize)]
struct CommonEntry {
    name: String,
    company: String,
    fund_count: usize,
    total_weight: f64,
    avg_weight: f64,
}

#[derive(Debug, Serialize)]
struct HoldingsReport {
    total_files: usize,
    total_funds: usize,
    unique_companies: usize,
    funds: Vec<FundEntry>,
    top_by_fund_count: Vec<CompanyEntry>,
    top_by_total_weight: Vec<CompanyEntry>,
    common_in_all_funds: Vec<CommonEntry>,
}

/// Intermediate row carrying raw weights for sorting.
struct RawEntry {
    name: String,
    fund_count: usize,
    total_weight: f64,
    avg_weight: f64,
    sample_funds: Vec<String>,
}

/// Build the holdings report JSON.
///
/// `max_companies` caps every ranked list; zero or negative means
/// unlimited.
pub fn build_report(agg: &AggregatedHoldings, max_companies: i64) -> Result<serde_json::Value> {
    let mut rows: Vec<RawEntry> = agg
        .companies
        .iter()
        .map(|(name, stats)| RawEntry {
            name: name.clone(),
            fund_count: stats.fund_count,
            total_weight: stats.total_weight,
            avg_weight: stats.avg_weight(),
            sample_funds: stats.sample_funds.clone(),
        })
        .collect();

    let funds: Vec<FundEntry> = agg
        .funds
        .values()
        .map(|f| FundEntry {
            name: f.name.clone(),
            aum: f.aum.clone(),
        })
        .collect();

    let total_funds = agg.funds.len();

    rows.sort_by(|a, b| {
        b.fund_count
            .cmp(&a.fund_count)
            .then_with(|| b.total_weight.total_cmp(&a.total_weight))
            .then_with(|| a.name.cmp(&b.name))
    });
    let top_by_fund_count: Vec<CompanyEntry> = rows
        .iter()
        .take(limit(rows.len(), max_companies))
        .map(to_entry)
        .collect();

    rows.sort_by(|a, b| {
        b.total_weight
            .total_cmp(&a.total_weight)
            .then_with(|| b.fund_count.cmp(&a.fund_count))
            .then_with(|| a.name.cmp(&b.name))
    });
    let top_by_total_weight: Vec<CompanyEntry> = rows
        .iter()
        .take(limit(rows.len(), max_companies))
        .map(to_entry)
        .collect();

    // Only meaningful with at least one fund; fund_count 0 == total_funds 0
    // would otherwise mark every company of an empty run as common.
    let mut common: Vec<&RawEntry> = if total_funds > 0 {
        rows.iter().filter(|r| r.fund_count == total_funds).collect()
    } else {
        Vec::new()
    };
    common.sort_by(|a, b| {
        b.total_weight
            .total_cmp(&a.total_weight)
            .then_with(|| a.name.cmp(&b.name))
    });
    let common_in_all_funds: Vec<CommonEntry> = common
        .iter()
        .take(limit(common.len(), max_companies))
        .map(|r| CommonEntry {
            name: r.name.clone(),
            company: r.name.clone(),
            fund_count: r.fund_count,
            total_weight: round2(r.total_weight),
            avg_weight: round3(r.avg_weight),
        })
        .collect();

    let report = HoldingsReport {
        total_files: agg.total_files,
        total_funds,
        unique_companies: agg.companies.len(),
        funds,
        top_by_fund_count,
        top_by_total_weight,
        common_in_all_funds,
    };

    Ok(serde_json::to_value(report)?)
}

fn to_entry(row: &RawEntry) -> CompanyEntry {
    CompanyEntry {
        name: row.name.clone(),
        company: row.name.clone(),
        fund_count: row.fund_count,
        total_weight: round2(row.total_weight),
        avg_weight: round3(row.avg_weight),
        sample_funds: row.sample_funds.clone(),
    }
}

fn limit(len: usize, max: i64) -> usize {
    if max > 0 {
        len.min(max as usize)
    } else {
        len
    }
}

// ============================================================================
// Tests
// ============================================================================
