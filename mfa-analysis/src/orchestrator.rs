//! Run coordination: fetch, analyze, persist, summarize.
//!
//! One run covers one date and one or all enabled analyses. Failure
//! handling is tiered: a bad URL skips that URL, a failed persist fails
//! that category, and only broken configuration aborts the run. The
//! shutdown flag is honored between categories, so an in-flight category
//! always finishes and persists.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{error, info, warn};

use mfa_common::{AnalysisConfig, AnalysisParams, Error, MfaConfig, Result};

use crate::analysis::{create_analyzer, Analyzer, FetchedDocument};
use crate::fetch::{CoinApiFetcher, DocumentFetcher, SharedFetchPacer};
use crate::storage::{JsonStore, RawDataPaths, ReportPaths};

// ============================================================================
// Run Results
// ============================================================================

/// Outcome of one category (or of the whole batch for non-categorized
/// analyses).
#[derive(Debug, Clone, Serialize)]
pub struct CategoryOutcome {
    pub category: String,
    pub success: bool,
    pub urls_total: usize,
    pub urls_fetched: usize,
    pub funds: usize,
    pub companies: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-analysis summary over its categories.
#[derive(Debug, Serialize)]
pub struct AnalysisSummary {
    pub analysis: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub total_categories: usize,
    pub categories_processed: usize,
    pub total_funds: usize,
    pub total_companies: usize,
    pub categories: Vec<CategoryOutcome>,
}

impl AnalysisSummary {
    fn new(analysis: &str, kind: &str, total_categories: usize) -> Self {
        Self {
            analysis: analysis.to_string(),
            kind: kind.to_string(),
            total_categories,
            categories_processed: 0,
            total_funds: 0,
            total_companies: 0,
            categories: Vec::new(),
        }
    }

    fn record(&mut self, outcome: CategoryOutcome) {
        if outcome.success {
            self.categories_processed += 1;
            self.total_funds += outcome.funds;
            self.total_companies += outcome.companies;
        }
        self.categories.push(outcome);
    }

    /// Share of categories that produced a report, in percent.
    pub fn success_rate(&self) -> f64 {
        if self.total_categories == 0 {
            return 0.0;
        }
        self.categories_processed as f64 / self.total_categories as f64 * 100.0
    }
}

/// Everything one `run` call did.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub date: String,
    pub analyses: Vec<AnalysisSummary>,
}

impl RunReport {
    /// True when every selected category persisted its report.
    pub fn all_succeeded(&self) -> bool {
        self.analyses
            .iter()
            .all(|a| a.categories_processed == a.total_categories)
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Drives analyses end to end against one configuration.
pub struct AnalysisOrchestrator {
    config: Arc<MfaConfig>,
    report_paths: ReportPaths,
    raw_paths: RawDataPaths,
    pacer: SharedFetchPacer,
    shutdown: Arc<AtomicBool>,
    fetcher_override: Option<Arc<dyn DocumentFetcher>>,
}

impl AnalysisOrchestrator {
    pub fn new(config: Arc<MfaConfig>) -> Self {
        let report_paths = ReportPaths::new(&config.paths.analysis_dir);
        let raw_paths = RawDataPaths::new(&config.paths.data_dir);
        let pacer = crate::fetch::shared_pacer("fetch", config.fetch.delay_between_requests_ms);

        Self {
            config,
            report_paths,
            raw_paths,
            pacer,
            shutdown: Arc::new(AtomicBool::new(false)),
            fetcher_override: None,
        }
    }

    /// Use one fixed fetcher for every analysis instead of building Coin
    /// API fetchers per analysis. Tests inject stubs through this.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn DocumentFetcher>) -> Self {
        self.fetcher_override = Some(fetcher);
        self
    }

    /// Flag that stops the run between categories when set.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Run one analysis by id, or every enabled analysis.
    ///
    /// `date` must be `YYYYMMDD`; the default is today. Configuration
    /// problems abort; fetch and persist problems degrade and are recorded
    /// in the returned report.
    pub async fn run(&self, analysis_id: Option<&str>, date: Option<&str>) -> Result<RunReport> {
        let date = resolve_date(date)?;

        let selected: Vec<(String, &AnalysisConfig)> = match analysis_id {
            Some(id) => vec![(id.to_string(), self.config.get_analysis(id)?)],
            None => self
                .config
                .enabled_analyses()
                .map(|(id, cfg)| (id.clone(), cfg))
                .collect(),
        };

        if selected.is_empty() {
            return Err(Error::configuration(
                "No enabled analyses configured; nothing to run",
            ));
        }

        info!(date = %date, analyses = selected.len(), "Starting analysis run");

        let mut analyses = Vec::new();
        for (id, analysis_config) in selected {
            if self.shutdown.load(Ordering::SeqCst) {
                warn!(analysis = %id, "Shutdown requested, skipping remaining analyses");
                break;
            }
            analyses.push(self.run_analysis(&id, analysis_config, &date).await?);
        }

        Ok(RunReport { date, analyses })
    }

    async fn run_analysis(
        &self,
        id: &str,
        analysis_config: &AnalysisConfig,
        date: &str,
    ) -> Result<AnalysisSummary> {
        let analyzer = create_analyzer(&analysis_config.kind, &analysis_config.params)?;
        let fetcher = self.fetcher_for(&analysis_config.params);

        let requirements = &analysis_config.data_requirements;
        let batches: Vec<(Option<String>, Vec<(String, f64)>)> = if analyzer.categorized() {
            if requirements.categories.is_empty() {
                return Err(Error::configuration(format!(
                    "Analysis '{}' of type '{}' requires data_requirements.categories",
                    id, analysis_config.kind
                )));
            }
            requirements
                .categories
                .iter()
                .map(|(name, urls)| {
                    let urls = urls.iter().map(|u| (u.clone(), 0.0)).collect();
                    (Some(name.clone()), urls)
                })
                .collect()
        } else {
            if requirements.funds.is_empty() {
                return Err(Error::configuration(format!(
                    "Analysis '{}' of type '{}' requires data_requirements.funds",
                    id, analysis_config.kind
                )));
            }
            let urls = requirements
                .funds
                .iter()
                .map(|f| (f.url.clone(), f.units))
                .collect();
            vec![(None, urls)]
        };

        info!(
            analysis = %id,
            kind = %analysis_config.kind,
            strategy = %requirements.scraping_strategy,
            categories = batches.len(),
            "Starting analysis"
        );

        let mut summary = AnalysisSummary::new(id, &analysis_config.kind, batches.len());
        for (category, urls) in batches {
            if self.shutdown.load(Ordering::SeqCst) {
                warn!(analysis = %id, "Shutdown requested, stopping before next category");
                break;
            }
            let outcome = self
                .run_category(
                    analyzer.as_ref(),
                    fetcher.as_ref(),
                    &analysis_config.kind,
                    category.as_deref(),
                    &urls,
                    date,
                )
                .await;
            summary.record(outcome);
        }

        info!(
            analysis = %id,
            processed = summary.categories_processed,
            total = summary.total_categories,
            funds = summary.total_funds,
            companies = summary.total_companies,
            "Analysis complete"
        );
        Ok(summary)
    }

    /// Fetch, analyze and persist one category. Never fails the run; the
    /// outcome records what happened.
    async fn run_category(
        &self,
        analyzer: &dyn Analyzer,
        fetcher: &dyn DocumentFetcher,
        kind: &str,
        category: Option<&str>,
        urls: &[(String, f64)],
        date: &str,
    ) -> CategoryOutcome {
        let label = category.unwrap_or(kind).to_string();

        let mut documents = Vec::new();
        for (url, units) in urls {
            match fetcher.fetch_document(url).await {
                Ok(document) => {
                    if self.config.fetch.save_raw_documents {
                        self.save_raw_document(date, kind, category, url, &document);
                    }
                    documents.push(FetchedDocument::new(url.clone(), document).with_units(*units));
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "Fetch failed, skipping URL");
                }
            }
        }

        let fetched = documents.len();
        let outcome = match analyzer.analyze(&documents) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(category = %label, error = %e, "Analysis failed");
                return CategoryOutcome {
                    category: label,
                    success: false,
                    urls_total: urls.len(),
                    urls_fetched: fetched,
                    funds: 0,
                    companies: 0,
                    report_path: None,
                    error: Some(e.to_string()),
                };
            }
        };

        let path = match category {
            Some(c) => self.report_paths.category_report(date, kind, c),
            None => self.report_paths.flat_report(date, kind),
        };

        if let Err(e) = JsonStore::save(&path, &outcome.report) {
            error!(category = %label, path = %path.display(), error = %e, "Failed to persist report");
            return CategoryOutcome {
                category: label,
                success: false,
                urls_total: urls.len(),
                urls_fetched: fetched,
                funds: outcome.fund_count,
                companies: outcome.company_count,
                report_path: None,
                error: Some(e.to_string()),
            };
        }

        info!(
            category = %label,
            urls = urls.len(),
            fetched,
            funds = outcome.fund_count,
            companies = outcome.company_count,
            report = %path.display(),
            "Category report persisted"
        );

        CategoryOutcome {
            category: label,
            success: true,
            urls_total: urls.len(),
            urls_fetched: fetched,
            funds: outcome.fund_count,
            companies: outcome.company_count,
            report_path: Some(path.display().to_string()),
            error: None,
        }
    }

    fn save_raw_document(
        &self,
        date: &str,
        kind: &str,
        category: Option<&str>,
        url: &str,
        document: &crate::document::FundDocument,
    ) {
        let path = self.raw_paths.document_path(date, kind, category, url);
        match serde_json::to_value(document) {
            Ok(value) => {
                if let Err(e) = JsonStore::save(&path, &value) {
                    warn!(path = %path.display(), error = %e, "Failed to save raw document");
                }
            }
            Err(e) => warn!(url = %url, error = %e, "Failed to encode raw document"),
        }
    }

    fn fetcher_for(&self, params: &AnalysisParams) -> Arc<dyn DocumentFetcher> {
        match &self.fetcher_override {
            Some(fetcher) => Arc::clone(fetcher),
            None => Arc::new(
                CoinApiFetcher::from_config(&self.config.fetch, params.max_holdings)
                    .with_pacer(Arc::clone(&self.pacer)),
            ),
        }
    }
}

/// Validate an explicit run date or fall back to today.
fn resolve_date(date: Option<&str>) -> Result<String> {
    match date {
        Some(raw) => {
            NaiveDate::parse_from_str(raw, "%Y%m%d").map_err(|_| {
                Error::configuration(format!("Invalid date '{}', expected YYYYMMDD", raw))
            })?;
            Ok(raw.to_string())
        }
        None => Ok(Local::now().format("%Y%m%d").to_string()),
    }
}

// ============================================================================
// Tests
// ============================================================================
