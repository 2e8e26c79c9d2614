//! Personal portfolio composition analysis.
//!
//! Answers "where is my money actually invested" for a targeted list of
//! fund positions: each fund's value from units and NAV, fanned out to
//! rupee amounts per underlying company.

pub mod aggregator;
pub mod processor;
pub mod report;

pub use aggregator::{aggregate, CompanyAllocation, FundContribution, PortfolioAggregate};
pub use processor::{PortfolioFund, PortfolioHolding, PortfolioProcessor};

use tracing::debug;

use mfa_common::{AnalysisParams, Result};

use super::{AnalysisOutcome, Analyzer, FetchedDocument, PORTFOLIO_KIND};

/// Portfolio analyzer: one report per run over the whole fund list.
#[derive(Debug)]
pub struct PortfolioAnalyzer {
    processor: PortfolioProcessor,
    chart_top_n: usize,
}

impl PortfolioAnalyzer {
    pub fn new(params: &AnalysisParams) -> Self {
        Self {
            processor: PortfolioProcessor::new(&params.exclude_from_analysis),
            chart_top_n: params.chart_top_n,
        }
    }
}

impl Analyzer for PortfolioAnalyzer {
    fn kind(&self) -> &'static str {
        PORTFOLIO_KIND
    }

    fn categorized(&self) -> bool {
        false
    }

    fn analyze(&self, documents: &[FetchedDocument]) -> Result<AnalysisOutcome> {
        let funds: Vec<PortfolioFund> = documents
            .iter()
            .filter_map(|d| self.processor.process(&d.document, &d.url, d.units))
            .collect();

        let aggregated = aggregate(&funds);
        debug!(
            documents = documents.len(),
            funds = funds.len(),
            companies = aggregated.allocations.len(),
            total_value = aggregated.total_value,
            "Aggregated portfolio"
        );

        let report = report::build_report(&aggregated, &funds, self.chart_top_n)?;

        Ok(AnalysisOutcome {
            report,
            fund_count: funds.len(),
            company_count: aggregated.allocations.len(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
