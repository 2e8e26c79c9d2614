//! Cross-fund holdings analysis.
//!
//! Answers "which companies do these funds hold, and how much" for one
//! category of funds: per-company fund counts, summed weights, and the
//! companies every fund in the category holds.

pub mod aggregator;
pub mod processor;
pub mod report;

pub use aggregator::{aggregate, AggregatedHoldings, CompanyStats, FundSummary};
pub use processor::{HoldingsProcessor, ProcessedFund, ProcessedHolding};

use tracing::debug;

use mfa_common::{AnalysisParams, Result};

use super::{AnalysisOutcome, Analyzer, FetchedDocument, HOLDINGS_KIND};

/// Holdings analyzer: one report per category of funds.
#[derive(Debug)]
pub struct HoldingsAnalyzer {
    processor: HoldingsProcessor,
    max_sample_funds: usize,
    max_companies: i64,
}

impl HoldingsAnalyzer {
    pub fn new(params: &AnalysisParams) -> Self {
        Self {
            processor: HoldingsProcessor::new(&params.exclude_from_analysis),
            max_sample_funds: params.max_sample_funds_per_company,
            max_companies: params.max_companies_in_results,
        }
    }
}

impl Analyzer for HoldingsAnalyzer {
    fn kind(&self) -> &'static str {
        HOLDINGS_KIND
    }

    fn categorized(&self) -> bool {
        true
    }

    fn analyze(&self, documents: &[FetchedDocument]) -> Result<AnalysisOutcome> {
        let funds: Vec<ProcessedFund> = documents
            .iter()
            .filter_map(|d| self.processor.process(&d.document, &d.url))
            .collect();

        let aggregated = aggregate(&funds, self.max_sample_funds);
        debug!(
            documents = documents.len(),
            funds = aggregated.funds.len(),
            companies = aggregated.companies.len(),
            "Aggregated holdings"
        );

        let report = report::build_report(&aggregated, self.max_companies)?;

        Ok(AnalysisOutcome {
            report,
            fund_count: aggregated.funds.len(),
            company_count: aggregated.companies.len(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{FundData, FundDocument, FundInfo, RawHolding};

    fn doc(url: &str, name: &str, rows: &[(&str, &str)]) -> FetchedDocument {
        let document = FundDocument::new(
            url,
            "coin-api",
            FundData {
                fund_info: FundInfo {
                    fund_name: name.to_string(),
                    ..FundInfo::default()
                },
                top_holdings: rows
                    .iter()
                    .enumerate()
                    .map(|(i, (company, pct))| RawHolding {
                        rank: i as u32 + 1,
                        company_name: company.to_string(),
                        allocation_percentage: pct.to_string(),
                        sector: None,
                    })
                    .collect(),
            },
        );
        FetchedDocument::new(url, document)
    }

    #[test]
    fn test_end_to_end_two_funds() {
        let analyzer = HoldingsAnalyzer::new(&AnalysisParams::default());
        let documents = vec![
            doc(
                "https://x/fund/INF1/a",
                "Fund A",
                &[("Reliance Industries Ltd", "8.0%"), ("TCS Ltd", "6.0%")],
            ),
            doc(
                "https://x/fund/INF2/b",
                "Fund B",
                &[("Reliance Industries Limited", "7.5%"), ("Infosys Ltd", "6.5%")],
            ),
        ];

        let outcome = analyzer.analyze(&documents).unwrap();

        assert_eq!(outcome.fund_count, 2);
        assert_eq!(outcome.company_count, 3);

        // Different legal suffixes collapse into one company.
        let common = outcome.report["common_in_all_funds"].as_array().unwrap();
        assert_eq!(common.len(), 1);
        assert_eq!(common[0]["name"], "Reliance Industries");
        assert_eq!(common[0]["fund_count"], 2);
        assert_eq!(common[0]["total_weight"], 15.5);
        assert_eq!(common[0]["avg_weight"], 7.75);
    }

    #[test]
    fn test_unusable_documents_are_skipped() {
        let analyzer = HoldingsAnalyzer::new(&AnalysisParams::default());
        let documents = vec![
            doc("https://x/fund/INF1/a", "Fund A", &[("Infosys Ltd", "5.0%")]),
            doc("https://x/fund/INF2/b", "Fund B", &[("", "3.0%")]),
        ];

        let outcome = analyzer.analyze(&documents).unwrap();
        assert_eq!(outcome.fund_count, 1);
        assert_eq!(outcome.report["total_files"], 1);
    }

    #[test]
    fn test_empty_batch_yields_empty_report() {
        let analyzer = HoldingsAnalyzer::new(&AnalysisParams::default());
        let outcome = analyzer.analyze(&[]).unwrap();

        assert_eq!(outcome.fund_count, 0);
        assert_eq!(outcome.company_count, 0);
        assert_eq!(outcome.report["total_funds"], 0);
    }
}
