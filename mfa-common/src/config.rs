//! Configuration management for the MFA pipeline.
//!
//! Configuration is a YAML file, by default at `config/config.yaml`.
//!
//! # Configuration Priority
//!
//! 1. Environment variable overrides (MFA_* prefix)
//! 2. Explicit config file values (with `${VAR}` placeholders expanded)
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `MFA_DATA_DIR` → paths.data_dir
//! - `MFA_ANALYSIS_DIR` → paths.analysis_dir
//! - `MFA_LOG_LEVEL` → logging.level
//! - `MFA_LOG_FORMAT` → logging.format
//! - `MFA_LISTEN_ADDR` → server.listen_addr

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default configuration file location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

/// Get the default configuration file path.
pub fn config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_PATH)
}

// ============================================================================
// Paths Configuration
// ============================================================================

/// Directory layout for pipeline outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputPaths {
    /// Root for raw fetched documents.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Root for analysis reports.
    #[serde(default = "default_analysis_dir")]
    pub analysis_dir: PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            analysis_dir: default_analysis_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("output/data")
}

fn default_analysis_dir() -> PathBuf {
    PathBuf::from("output/analysis")
}

// ============================================================================
// Fetch Configuration
// ============================================================================

/// HTTP fetching behavior shared by every analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Retry attempts on retryable status codes and transport errors.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff between retries, multiplied by the attempt number.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Minimum spacing between successive external requests.
    #[serde(default = "default_delay_between_requests_ms")]
    pub delay_between_requests_ms: u64,

    /// Persist each fetched document under `paths.data_dir` before analysis.
    #[serde(default)]
    pub save_raw_documents: bool,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            delay_between_requests_ms: default_delay_between_requests_ms(),
            save_raw_documents: false,
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_delay_between_requests_ms() -> u64 {
    1000
}

fn default_user_agent() -> String {
    "MFA-Portfolio-Analyzer/1.0".into()
}

// ============================================================================
// Logging & Server Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: "pretty" or "json".
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

/// Dashboard server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the read-only dashboard API binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> String {
    "127.0.0.1:8707".into()
}

// ============================================================================
// Analysis Configuration
// ============================================================================

/// How source documents for an analysis are located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchStrategy {
    /// URL lists grouped under named categories.
    ByCategory,
    /// A flat list of fund positions (url + units held).
    TargetedList,
    /// Category URL lists served directly by a public API.
    ApiDirect,
}

impl FetchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ByCategory => "by-category",
            Self::TargetedList => "targeted-list",
            Self::ApiDirect => "api-direct",
        }
    }
}

impl std::fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fund position for portfolio analyses: where the disclosure lives and
/// how many units are held.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundPosition {
    pub url: String,
    #[serde(default)]
    pub units: f64,
}

/// What an analysis needs fetched before it can run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataRequirements {
    pub scraping_strategy: FetchStrategy,

    /// Category name → disclosure URLs. Used by by-category / api-direct.
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<String>>,

    /// Fund positions. Used by targeted-list.
    #[serde(default)]
    pub funds: Vec<FundPosition>,
}

/// Tunables for a single analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisParams {
    /// Holdings to keep per fetched document.
    #[serde(default = "default_max_holdings")]
    pub max_holdings: usize,

    /// Instrument names dropped from aggregation (case-insensitive
    /// substring match against the normalized company name).
    #[serde(default)]
    pub exclude_from_analysis: Vec<String>,

    /// Cap on ranked result lists. Zero or negative means unlimited.
    #[serde(default = "default_max_companies")]
    pub max_companies_in_results: i64,

    /// Sample fund names kept per company.
    #[serde(default = "default_max_sample_funds")]
    pub max_sample_funds_per_company: usize,

    /// Allocations surfaced in the portfolio top-companies list.
    #[serde(default = "default_chart_top_n")]
    pub chart_top_n: usize,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            max_holdings: default_max_holdings(),
            exclude_from_analysis: Vec::new(),
            max_companies_in_results: default_max_companies(),
            max_sample_funds_per_company: default_max_sample_funds(),
            chart_top_n: default_chart_top_n(),
        }
    }
}

fn default_max_holdings() -> usize {
    50
}

fn default_max_companies() -> i64 {
    100
}

fn default_max_sample_funds() -> usize {
    5
}

fn default_chart_top_n() -> usize {
    20
}

/// Configuration for a single analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Analyzer type, e.g. "holdings" or "portfolio-composition".
    #[serde(rename = "type")]
    pub kind: String,

    pub data_requirements: DataRequirements,

    #[serde(default)]
    pub params: AnalysisParams,
}

fn default_enabled() -> bool {
    true
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Main configuration for the MFA pipeline.
///
/// Loaded once at startup and passed by reference (or `Arc`) to the
/// components that need it; nothing mutates it afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MfaConfig {
    #[serde(default)]
    pub paths: OutputPaths,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub server: ServerConfig,

    /// Analysis id → analysis configuration. Sorted map so that runs touch
    /// analyses in a stable order.
    #[serde(default)]
    pub analyses: BTreeMap<String, AnalysisConfig>,
}

impl MfaConfig {
    /// Load configuration from the default path.
    ///
    /// A missing file yields the defaults; a present but malformed file is
    /// an error.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::info!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::configuration(format!("failed to read config from {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from a YAML string, expanding `${VAR}`
    /// placeholders from the environment first. Unknown variables are left
    /// in place rather than erroring.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let expanded =
            shellexpand::env_with_context_no_errors(content, |var| std::env::var(var).ok());
        let config: Self = serde_yaml::from_str(expanded.as_ref())?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides applied.
    pub fn load_with_env(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load_from(p)?,
            None => Self::load()?,
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("MFA_DATA_DIR") {
            self.paths.data_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("MFA_ANALYSIS_DIR") {
            self.paths.analysis_dir = PathBuf::from(dir);
        }
        if let Ok(level) = std::env::var("MFA_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("MFA_LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Ok(addr) = std::env::var("MFA_LISTEN_ADDR") {
            self.server.listen_addr = addr;
        }
    }

    /// Analyses that are enabled, in id order.
    pub fn enabled_analyses(&self) -> impl Iterator<Item = (&String, &AnalysisConfig)> {
        self.analyses.iter().filter(|(_, a)| a.enabled)
    }

    /// Look up an analysis by id. Unknown or disabled ids are configuration
    /// errors, which abort a run.
    pub fn get_analysis(&self, id: &str) -> Result<&AnalysisConfig> {
        let analysis = self.analyses.get(id).ok_or_else(|| {
            let available: Vec<&str> = self.analyses.keys().map(String::as_str).collect();
            Error::configuration(format!(
                "unknown analysis '{id}', available: [{}]",
                available.join(", ")
            ))
        })?;
        if !analysis.enabled {
            return Err(Error::configuration(format!("analysis '{id}' is disabled")));
        }
        Ok(analysis)
    }

    /// Structural validation beyond what serde enforces.
    pub fn validate(&self) -> Result<()> {
        if self.fetch.timeout_seconds == 0 {
            return Err(Error::configuration("fetch.timeout_seconds must be positive"));
        }

        for (id, analysis) in &self.analyses {
            if analysis.kind.trim().is_empty() {
                return Err(Error::configuration(format!(
                    "analysis '{id}' has an empty type"
                )));
            }

            let reqs = &analysis.data_requirements;
            match reqs.scraping_strategy {
                FetchStrategy::ByCategory | FetchStrategy::ApiDirect => {
                    if reqs.categories.is_empty() {
                        return Err(Error::configuration(format!(
                            "analysis '{id}' uses {} but defines no categories",
                            reqs.scraping_strategy
                        )));
                    }
                }
                FetchStrategy::TargetedList => {
                    if reqs.funds.is_empty() {
                        return Err(Error::configuration(format!(
                            "analysis '{id}' uses targeted-list but defines no funds"
                        )));
                    }
                }
            }

            for fund in &reqs.funds {
                if fund.url.trim().is_empty() {
                    return Err(Error::configuration(format!(
                        "analysis '{id}' has a fund entry with an empty url"
                    )));
                }
                if fund.units < 0.0 {
                    return Err(Error::configuration(format!(
                        "analysis '{id}' has negative units for {}",
                        fund.url
                    )));
                }
            }

            for (category, urls) in &reqs.categories {
                if urls.iter().any(|u| u.trim().is_empty()) {
                    return Err(Error::configuration(format!(
                        "analysis '{id}' category '{category}' contains an empty url"
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
paths:
  data_dir: out/data
  analysis_dir: out/analysis
fetch:
  timeout_seconds: 10
  delay_between_requests_ms: 250
analyses:
  market_holdings:
    enabled: true
    type: holdings
    data_requirements:
      scraping_strategy: by-category
      categories:
        large-cap:
          - https://example.com/mf/fund/INF1/alpha-fund
          - https://example.com/mf/fund/INF2/beta-fund
    params:
      exclude_from_analysis: ["CASH", "TREPS"]
      max_companies_in_results: 50
  my_portfolio:
    enabled: false
    type: portfolio-composition
    data_requirements:
      scraping_strategy: targeted-list
      funds:
        - url: https://example.com/mf/fund/INF1/alpha-fund
          units: 1500.5
"#;

    #[test]
    fn test_parse_sample() {
        let config = MfaConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.paths.data_dir, PathBuf::from("out/data"));
        assert_eq!(config.fetch.timeout_seconds, 10);
        assert_eq!(config.fetch.delay_between_requests_ms, 250);
        // Untouched fields keep their defaults.
        assert_eq!(config.fetch.max_retries, 3);
        assert_eq!(config.fetch.user_agent, "MFA-Portfolio-Analyzer/1.0");

        let holdings = &config.analyses["market_holdings"];
        assert_eq!(holdings.kind, "holdings");
        assert_eq!(
            holdings.data_requirements.scraping_strategy,
            FetchStrategy::ByCategory
        );
        assert_eq!(holdings.params.max_companies_in_results, 50);
        assert_eq!(holdings.params.max_sample_funds_per_company, 5);

        let portfolio = &config.analyses["my_portfolio"];
        assert!(!portfolio.enabled);
        assert_eq!(portfolio.data_requirements.funds[0].units, 1500.5);

        config.validate().unwrap();
    }

    #[test]
    fn test_defaults_when_empty() {
        let config = MfaConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config.paths.analysis_dir, PathBuf::from("output/analysis"));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.server.listen_addr, "127.0.0.1:8707");
        assert!(config.analyses.is_empty());
    }

    #[test]
    fn test_env_placeholder_expansion() {
        std::env::set_var("MFA_TEST_BASE", "/srv/mfa");
        let yaml = "paths:\n  data_dir: ${MFA_TEST_BASE}/data\n";
        let config = MfaConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.paths.data_dir, PathBuf::from("/srv/mfa/data"));
        std::env::remove_var("MFA_TEST_BASE");
    }

    #[test]
    fn test_unknown_placeholder_left_in_place() {
        let yaml = "paths:\n  data_dir: ${MFA_TEST_UNSET_VAR}/data\n";
        let config = MfaConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(
            config.paths.data_dir,
            PathBuf::from("${MFA_TEST_UNSET_VAR}/data")
        );
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        let yaml = r#"
analyses:
  bad:
    type: holdings
    data_requirements:
      scraping_strategy: crawl-the-web
"#;
        assert!(MfaConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_validate_targeted_needs_funds() {
        let yaml = r#"
analyses:
  p:
    type: portfolio-composition
    data_requirements:
      scraping_strategy: targeted-list
"#;
        let config = MfaConfig::from_yaml_str(yaml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("targeted-list"));
    }

    #[test]
    fn test_validate_by_category_needs_categories() {
        let yaml = r#"
analyses:
  h:
    type: holdings
    data_requirements:
      scraping_strategy: by-category
"#;
        let config = MfaConfig::from_yaml_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_negative_units() {
        let yaml = r#"
analyses:
  p:
    type: portfolio-composition
    data_requirements:
      scraping_strategy: targeted-list
      funds:
        - url: https://example.com/mf/fund/INF1/f
          units: -3.0
"#;
        let config = MfaConfig::from_yaml_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_get_analysis_unknown_and_disabled() {
        let config = MfaConfig::from_yaml_str(SAMPLE).unwrap();
        assert!(config.get_analysis("market_holdings").is_ok());

        let err = config.get_analysis("nope").unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("unknown analysis"));

        let err = config.get_analysis("my_portfolio").unwrap_err();
        assert!(err.to_string().contains("disabled"));
    }

    #[test]
    fn test_enabled_analyses_order() {
        let config = MfaConfig::from_yaml_str(SAMPLE).unwrap();
        let ids: Vec<&String> = config.enabled_analyses().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["market_holdings"]);
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("MFA_ANALYSIS_DIR", "/tmp/mfa-analysis");
        let mut config = MfaConfig::default();
        config.apply_env_overrides();
        assert_eq!(config.paths.analysis_dir, PathBuf::from("/tmp/mfa-analysis"));
        std::env::remove_var("MFA_ANALYSIS_DIR");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, SAMPLE).unwrap();

        let config = MfaConfig::load_from(&path).unwrap();
        assert_eq!(config.analyses.len(), 2);

        let err = MfaConfig::load_from(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(err.is_fatal());
    }
}
