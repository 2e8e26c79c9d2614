//! Report shape for the portfolio composition analysis.
//!
//! Monetary fields are whole rupees; percentages carry two decimals.
//! Field names are a compatibility contract with the persisted report
//! consumers.

use serde::Serialize;

use mfa_common::Result;

use super::aggregator::PortfolioAggregate;
use super::processor::PortfolioFund;
use crate::analysis::{round2, to_currency};

#[derive(Debug, Serialize)]
struct PortfolioSummary {
    total_value: i64,
    fund_count: usize,
    unique_companies: usize,
    top_n: usize,
}

#[derive(Debug, Serialize)]
struct FundRow {
    fund_name: String,
    url: String,
    units: f64,
    nav: f64,
    value: i64,
}

#[derive(Debug, Clone, Serialize)]
struct ContributionRow {
    fund_name: String,
    contribution: i64,
}

#[derive(Debug, Clone, Serialize)]
struct AllocationRow {
    company_name: String,
    amount: i64,
    percentage: f64,
    from_funds: Vec<ContributionRow>,
}

#[derive(Debug, Serialize)]
struct PortfolioReport {
    portfolio_summary: PortfolioSummary,
    funds: Vec<FundRow>,
    company_allocations: Vec<AllocationRow>,
    top_companies: Vec<AllocationRow>,
}

/// Build the portfolio report JSON.
///
/// `funds` stay in processing order; allocations keep the aggregate's
/// ordering. `top_companies` is the head of the allocation list,
/// `chart_top_n` entries long.
pub fn build_report(
    agg: &PortfolioAggregate,
    funds: &[PortfolioFund],
    chart_top_n: usize,
) -> Result<serde_json::Value> {
    let total_value = agg.total_value;

    let allocations: Vec<AllocationRow> = agg
        .allocations
        .iter()
        .map(|allocation| {
            let percentage = if total_value > 0.0 {
                round2(allocation.amount / total_value * 100.0)
            } else {
                0.0
            };

            AllocationRow {
                company_name: allocation.company.clone(),
                amount: to_currency(allocation.amount),
                percentage,
                from_funds: allocation
                    .sources
                    .iter()
                    .map(|source| ContributionRow {
                        fund_name: source.fund_name.clone(),
                        contribution: to_currency(source.amount),
                    })
                    .collect(),
            }
        })
        .collect();

    let top_companies: Vec<AllocationRow> =
        allocations.iter().take(chart_top_n).cloned().collect();

    let fund_rows: Vec<FundRow> = funds
        .iter()
        .map(|fund| FundRow {
            fund_name: fund.fund_name.clone(),
            url: fund.url.clone(),
            units: fund.units,
            nav: fund.nav,
            value: to_currency(fund.value),
        })
        .collect();

    let report = PortfolioReport {
        portfolio_summary: PortfolioSummary {
            total_value: to_currency(total_value),
            fund_count: fund_rows.len(),
            unique_companies: allocations.len(),
            top_n: chart_top_n,
        },
        funds: fund_rows,
        company_allocations: allocations,
        top_companies,
    };

    Ok(serde_json::to_value(report)?)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::super::aggregator::aggregate;
    use super::super::processor::{PortfolioFund, PortfolioHolding};
    use super::*;

    fn fund(name: &str, units: f64, nav: f64, holdings: &[(&str, f64)]) -> PortfolioFund {
        PortfolioFund {
            fund_name: name.to_string(),
            url: format!("https://x/fund/{}", name),
            units,
            nav,
            value: units * nav,
            holdings: holdings
                .iter()
                .map(|(company, amount)| PortfolioHolding {
                    company: company.to_string(),
                    amount: *amount,
                })
                .collect(),
        }
    }

    #[test]
    fn test_report_shape_and_math() {
        let funds = vec![
            fund("Fund A", 10.0, 100.0, &[("Reliance Industries", 400.0)]),
            fund("Fund B", 5.0, 200.0, &[("Reliance Industries", 100.0), ("Infosys", 500.0)]),
        ];
        let report = build_report(&aggregate(&funds), &funds, 20).unwrap();

        let summary = &report["portfolio_summary"];
        assert_eq!(summary["total_value"], 2000);
        assert_eq!(summary["fund_count"], 2);
        assert_eq!(summary["unique_companies"], 2);
        assert_eq!(summary["top_n"], 20);

        // Funds keep processing order.
        let fund_rows = report["funds"].as_array().unwrap();
        assert_eq!(fund_rows[0]["fund_name"], "Fund A");
        assert_eq!(fund_rows[0]["value"], 1000);
        assert_eq!(fund_rows[1]["nav"], 200.0);

        let allocations = report["company_allocations"].as_array().unwrap();
        assert_eq!(allocations[0]["company_name"], "Infosys");
        assert_eq!(allocations[0]["amount"], 500);
        assert_eq!(allocations[0]["percentage"], 25.0);
        assert_eq!(allocations[1]["company_name"], "Reliance Industries");
        assert_eq!(allocations[1]["amount"], 500);
        assert_eq!(allocations[1]["percentage"], 25.0);

        let from_funds = allocations[1]["from_funds"].as_array().unwrap();
        assert_eq!(from_funds.len(), 2);
        assert_eq!(from_funds[0]["fund_name"], "Fund A");
        assert_eq!(from_funds[0]["contribution"], 400);
        assert_eq!(from_funds[1]["contribution"], 100);
    }

    #[test]
    fn test_top_companies_is_capped_head() {
        let funds = vec![fund(
            "Fund A",
            1.0,
            100.0,
            &[("Alpha", 50.0), ("Beta", 30.0), ("Gamma", 20.0)],
        )];
        let report = build_report(&aggregate(&funds), &funds, 2).unwrap();

        let top = report["top_companies"].as_array().unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0]["company_name"], "Alpha");
        assert_eq!(top[1]["company_name"], "Beta");
        // top_n echoes the configured cap, not the list length.
        assert_eq!(report["portfolio_summary"]["top_n"], 2);
        assert_eq!(report["company_allocations"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_zero_total_value_gives_zero_percentages() {
        let funds = vec![fund("Fund A", 0.0, 0.0, &[("Alpha", 0.0)])];
        let report = build_report(&aggregate(&funds), &funds, 20).unwrap();

        assert_eq!(report["portfolio_summary"]["total_value"], 0);
        let allocations = report["company_allocations"].as_array().unwrap();
        assert_eq!(allocations[0]["percentage"], 0.0);
    }

    #[test]
    fn test_empty_portfolio_report() {
        let report = build_report(&aggregate(&[]), &[], 20).unwrap();

        assert_eq!(report["portfolio_summary"]["fund_count"], 0);
        assert!(report["funds"].as_array().unwrap().is_empty());
        assert!(report["top_companies"].as_array().unwrap().is_empty());
    }
}
