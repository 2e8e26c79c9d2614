//! Analysis Module.
//!
//! Turns fetched fund disclosures into persisted JSON reports.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Analysis pipeline                       │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  ┌───────────┐    ┌───────────┐    ┌────────────┐            │
//! │  │ Processor │───▶│ Aggregator│───▶│   Report   │            │
//! │  │ (per doc) │    │ (per run) │    │  (JSON)    │            │
//! │  └───────────┘    └───────────┘    └────────────┘            │
//! │                                                              │
//! │  holdings:  weights across funds within a category           │
//! │  portfolio: money allocation across a personal fund list     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every analyzer consumes the same `FetchedDocument` batch and emits one
//! JSON report. Analyzers never touch the network or the filesystem; the
//! orchestrator owns both sides.

pub mod holdings;
pub mod portfolio;

pub use holdings::HoldingsAnalyzer;
pub use portfolio::PortfolioAnalyzer;

use mfa_common::{AnalysisParams, Error, Result};

use crate::document::FundDocument;

// ============================================================================
// Analyzer Kinds
// ============================================================================

/// Config `type` string for the cross-fund holdings analysis.
pub const HOLDINGS_KIND: &str = "holdings";

/// Config `type` string for the personal portfolio composition analysis.
pub const PORTFOLIO_KIND: &str = "portfolio-composition";

/// Every analyzer kind this build knows how to create.
pub fn available_kinds() -> &'static [&'static str] {
    &[HOLDINGS_KIND, PORTFOLIO_KIND]
}

// ============================================================================
// Analyzer Seam
// ============================================================================

/// One successfully fetched document, tagged with where it came from.
///
/// `units` is only meaningful for targeted-list analyses; categorized
/// analyses carry zero.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub url: String,
    pub units: f64,
    pub document: FundDocument,
}

impl FetchedDocument {
    pub fn new(url: impl Into<String>, document: FundDocument) -> Self {
        Self {
            url: url.into(),
            units: 0.0,
            document,
        }
    }

    pub fn with_units(mut self, units: f64) -> Self {
        self.units = units;
        self
    }
}

/// Result of analyzing one document batch.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    /// The report exactly as it will be persisted.
    pub report: serde_json::Value,
    /// Distinct funds that contributed to the report.
    pub fund_count: usize,
    /// Distinct companies in the report.
    pub company_count: usize,
}

/// A complete analysis: documents in, one JSON report out.
///
/// Implementations are pure over their input batch, so a batch of zero
/// documents yields a valid empty report rather than an error.
pub trait Analyzer: Send + Sync + std::fmt::Debug {
    /// The config `type` string this analyzer answers to.
    fn kind(&self) -> &'static str;

    /// Whether the analysis consumes per-category URL groups and emits one
    /// report per category. Non-categorized analyses take a flat fund list
    /// and emit a single report.
    fn categorized(&self) -> bool;

    /// Build the report for one batch of fetched documents.
    fn analyze(&self, documents: &[FetchedDocument]) -> Result<AnalysisOutcome>;
}

/// Create the analyzer for a config `type` string.
///
/// The lookup table is fixed at compile time; an unknown type is a
/// configuration error that names the valid alternatives.
pub fn create_analyzer(kind: &str, params: &AnalysisParams) -> Result<Box<dyn Analyzer>> {
    match kind {
        HOLDINGS_KIND => Ok(Box::new(HoldingsAnalyzer::new(params))),
        PORTFOLIO_KIND => Ok(Box::new(PortfolioAnalyzer::new(params))),
        other => Err(Error::configuration(format!(
            "Unknown analysis type '{}' (available: {})",
            other,
            available_kinds().join(", ")
        ))),
    }
}

// ============================================================================
// Shared Rounding
// ============================================================================

/// Round to 2 decimal places, the contract for weights and percentages.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to 3 decimal places, the contract for per-fund average weights.
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Round a monetary amount to the nearest whole currency unit.
pub(crate) fn to_currency(value: f64) -> i64 {
    value.round() as i64
}

// ============================================================================
// Tests
// ============================================================================
