//! Path contract for persisted reports and raw documents.
//!
//! Every component that lands in a path goes through `sanitize` first, so
//! a category named `large/cap` cannot escape its directory.

use std::path::{Path, PathBuf};

/// Replace anything outside `[A-Za-z0-9._-]` with `_`. Components that
/// would be empty or a dot-traversal collapse to `_`.
fn sanitize(component: &str) -> String {
    let cleaned: String = component
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}

// ============================================================================
// Report Paths
// ============================================================================

/// Builds output paths for analysis reports under `analysis_dir`.
#[derive(Debug, Clone)]
pub struct ReportPaths {
    root: PathBuf,
}

impl ReportPaths {
    pub fn new(analysis_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: analysis_dir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding every report of one run date.
    pub fn date_dir(&self, date: &str) -> PathBuf {
        self.root.join(sanitize(date))
    }

    /// Report path for a categorized analysis.
    pub fn category_report(&self, date: &str, analysis_type: &str, category: &str) -> PathBuf {
        self.date_dir(date)
            .join(sanitize(analysis_type))
            .join(format!("{}.json", sanitize(category)))
    }

    /// Report path for a non-categorized analysis.
    pub fn flat_report(&self, date: &str, analysis_type: &str) -> PathBuf {
        self.date_dir(date)
            .join(format!("{}.json", sanitize(analysis_type)))
    }
}

// ============================================================================
// Raw Data Paths
// ============================================================================

/// Builds paths for raw fetched documents under `data_dir`.
#[derive(Debug, Clone)]
pub struct RawDataPaths {
    root: PathBuf,
}

impl RawDataPaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: data_dir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path for one fetched document.
    ///
    /// Categorized analyses get a per-category directory; targeted-list
    /// analyses store directly under the analysis type.
    pub fn document_path(
        &self,
        date: &str,
        analysis_type: &str,
        category: Option<&str>,
        url: &str,
    ) -> PathBuf {
        let mut dir = self.root.join(sanitize(date)).join(sanitize(analysis_type));
        if let Some(category) = category {
            dir = dir.join(sanitize(category));
        }
        dir.join(filename_from_url(url))
    }
}

/// Filename for a fetched document: `coin_` plus the last two URL path
/// segments, which carry the fund id and name slug.
fn filename_from_url(url: &str) -> String {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url)
        .trim_matches('/');

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let identifier = match segments.as_slice() {
        [.., code, name] => format!("{}_{}", code, name),
        [single] => (*single).to_string(),
        [] => "document".to_string(),
    };

    format!("coin_{}.json", sanitize(&identifier))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_report_layout() {
        let paths = ReportPaths::new("output/analysis");
        assert_eq!(
            paths.category_report("20250115", "holdings", "largeCap"),
            PathBuf::from("output/analysis/20250115/holdings/largeCap.json")
        );
    }

    #[test]
    fn test_flat_report_layout() {
        let paths = ReportPaths::new("output/analysis");
        assert_eq!(
            paths.flat_report("20250115", "portfolio-composition"),
            PathBuf::from("output/analysis/20250115/portfolio-composition.json")
        );
    }

    #[test]
    fn test_components_cannot_escape() {
        let paths = ReportPaths::new("out");
        let path = paths.category_report("20250115", "holdings", "../evil");
        assert_eq!(path, PathBuf::from("out/20250115/holdings/.._evil.json"));
    }

    #[test]
    fn test_document_path_categorized() {
        let paths = RawDataPaths::new("output/data");
        let path = paths.document_path(
            "20250115",
            "holdings",
            Some("largeCap"),
            "https://coin.example.com/mf/fund/INF174K01LS9/alpha-flexi-cap-direct-growth",
        );
        assert_eq!(
            path,
            PathBuf::from(
                "output/data/20250115/holdings/largeCap/coin_INF174K01LS9_alpha-flexi-cap-direct-growth.json"
            )
        );
    }

    #[test]
    fn test_document_path_flat_strips_query() {
        let paths = RawDataPaths::new("data");
        let path = paths.document_path(
            "20250115",
            "portfolio-composition",
            None,
            "https://x/fund/INF1/beta-fund?tab=holdings",
        );
        assert_eq!(
            path,
            PathBuf::from("data/20250115/portfolio-composition/coin_INF1_beta-fund.json")
        );
    }

    #[test]
    fn test_filename_fallbacks() {
        assert_eq!(filename_from_url("https://x/solo"), "coin_x_solo.json");
        assert_eq!(filename_from_url("solo"), "coin_solo.json");
        assert_eq!(filename_from_url(""), "coin_document.json");
    }
}
