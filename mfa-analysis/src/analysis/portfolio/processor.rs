//! Per-document math for the portfolio composition analysis.
//!
//! Converts a fetched disclosure plus the owned unit count into rupee
//! amounts per company. NAV comes from the document; when it is missing
//! the fund degrades to its unit count as a nominal value so the run can
//! still finish.

use tracing::{debug, warn};

use crate::document::FundDocument;
use crate::normalize::{normalize_company_name, parse_percentage_as_fraction, ExclusionList};

/// One holding expressed as money.
#[derive(Debug, Clone)]
pub struct PortfolioHolding {
    /// Normalized company name.
    pub company: String,
    /// Rupee amount of this fund's position attributable to the company.
    pub amount: f64,
}

/// A personal fund position with its per-company amounts.
#[derive(Debug, Clone)]
pub struct PortfolioFund {
    pub fund_name: String,
    pub url: String,
    pub units: f64,
    pub nav: f64,
    /// `units × nav`, or bare `units` when NAV was unavailable.
    pub value: f64,
    pub holdings: Vec<PortfolioHolding>,
}

/// Turns documents into money-weighted fund positions.
#[derive(Debug)]
pub struct PortfolioProcessor {
    exclusions: ExclusionList,
}

impl PortfolioProcessor {
    pub fn new(exclude_from_analysis: &[String]) -> Self {
        Self {
            exclusions: ExclusionList::new(exclude_from_analysis),
        }
    }

    /// Process one document for a fund held at `units`.
    ///
    /// Returns `None` when no holding row survives cleaning; the fund then
    /// contributes nothing, not even its value.
    pub fn process(
        &self,
        document: &FundDocument,
        url: &str,
        units: f64,
    ) -> Option<PortfolioFund> {
        let info = &document.data.fund_info;
        let nav = crate::normalize::parse_currency(&info.current_nav);

        let value = if nav > 0.0 {
            let value = units * nav;
            debug!(url = %url, units, nav, value, "Computed fund value");
            value
        } else {
            warn!(url = %url, units, "NAV unavailable, using units as nominal value");
            units
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

            let fraction = parse_percentage_as_fraction(&raw.allocation_percentage);
            if fraction <= 0.0 {
                continue;
            }

            holdings.push(PortfolioHolding {
                company,
                amount: value * fraction,
            });
        }

        if holdings.is_empty() {
            debug!(url = %url, "No usable holdings after cleaning, skipping fund");
            return None;
        }

        Some(PortfolioFund {
            fund_name: info.fund_name.trim().to_string(),
            url: url.to_string(),
            units,
            nav,
            value,
            holdings,
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

    fn doc(name: &str, nav: &str, rows: &[(&str, &str)]) -> FundDocument {
        FundDocument::new(
            "https://x/fund/INF1/alpha",
            "coin-api",
            FundData {
                fund_info: FundInfo {
                    fund_name: name.to_string(),
                    current_nav: nav.to_string(),
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
        )
    }

    #[test]
    fn test_value_and_amounts() {
        let processor = PortfolioProcessor::new(&[]);
        let doc = doc(
            "Alpha Fund",
            "100.0",
            &[("Reliance Industries Ltd", "8%"), ("Infosys Ltd", "50%")],
        );

        let fund = processor.process(&doc, "https://x/fund/INF1/alpha", 10.0).unwrap();
        assert_eq!(fund.fund_name, "Alpha Fund");
        assert_eq!(fund.nav, 100.0);
        assert_eq!(fund.value, 1000.0);
        assert_eq!(fund.holdings.len(), 2);
        assert_eq!(fund.holdings[0].company, "Reliance Industries");
        assert_eq!(fund.holdings[0].amount, 80.0);
        assert_eq!(fund.holdings[1].amount, 500.0);
    }

    #[test]
    fn test_missing_nav_falls_back_to_units() {
        let processor = PortfolioProcessor::new(&[]);
        let doc = doc("Alpha Fund", "", &[("Infosys Ltd", "50%")]);

        let fund = processor.process(&doc, "https://x", 200.0).unwrap();
        assert_eq!(fund.nav, 0.0);
        assert_eq!(fund.value, 200.0);
        assert_eq!(fund.holdings[0].amount, 100.0);
    }

    #[test]
    fn test_exclusions_and_zero_fractions_drop_rows() {
        let processor = PortfolioProcessor::new(&["TREPS".to_string()]);
        let doc = doc(
            "Alpha Fund",
            "50",
            &[
                ("TREPS", "4%"),
                ("HDFC Bank Ltd", "0%"),
                ("Tata Motors Ltd", "10%"),
            ],
        );

        let fund = processor.process(&doc, "https://x", 2.0).unwrap();
        assert_eq!(fund.holdings.len(), 1);
        assert_eq!(fund.holdings[0].company, "Tata Motors");
        assert_eq!(fund.holdings[0].amount, 10.0);
    }

    #[test]
    fn test_nothing_usable_returns_none() {
        let processor = PortfolioProcessor::new(&[]);
        let doc = doc("Alpha Fund", "100", &[("", "5%")]);
        assert!(processor.process(&doc, "https://x", 10.0).is_none());
    }
}
