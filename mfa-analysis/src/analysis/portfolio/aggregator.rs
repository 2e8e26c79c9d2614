//! Cross-fund aggregation for the portfolio composition analysis.
//!
//! Sums rupee amounts per company across every fund position and fixes a
//! deterministic ordering: amount descending, name ascending on ties.

use std::collections::BTreeMap;

use super::processor::PortfolioFund;

/// One fund's contribution to a company.
#[derive(Debug, Clone)]
pub struct FundContribution {
    pub fund_name: String,
    pub amount: f64,
}

/// Total allocation to one company across the portfolio.
#[derive(Debug, Clone)]
pub struct CompanyAllocation {
    pub company: String,
    pub amount: f64,
    /// Every contributing row, in fund processing order.
    pub sources: Vec<FundContribution>,
}

/// Aggregated portfolio, ready for the report builder.
#[derive(Debug, Default)]
pub struct PortfolioAggregate {
    /// Sum of all fund values.
    pub total_value: f64,
    /// Allocations ordered by amount desc, company name asc.
    pub allocations: Vec<CompanyAllocation>,
}

/// Aggregate fund positions into per-company allocations.
pub fn aggregate(funds: &[PortfolioFund]) -> PortfolioAggregate {
    let mut by_company: BTreeMap<String, CompanyAllocation> = BTreeMap::new();
    let mut total_value = 0.0;

    for fund in funds {
        total_value += fund.value;
        for holding in &fund.holdings {
            let entry = by_company
                .entry(holding.company.clone())
                .or_insert_with(|| CompanyAllocation {
                    company: holding.company.clone(),
                    amount: 0.0,
                    sources: Vec::new(),
                });
            entry.amount += holding.amount;
            entry.sources.push(FundContribution {
                fund_name: fund.fund_name.clone(),
                amount: holding.amount,
            });
        }
    }

    let mut allocations: Vec<CompanyAllocation> = by_company.into_values().collect();
    allocations.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then_with(|| a.company.cmp(&b.company))
    });

    PortfolioAggregate {
        total_value,
        allocations,
    }
}

// ============================================================================
// Tests
// ============================================================================
