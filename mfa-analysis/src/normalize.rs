//! Company-name normalization and lenient numeric parsing.
//!
//! Disclosure documents spell the same issuer a dozen ways ("Reliance
//! Industries Ltd", "Reliance Industries Limited", "RELIANCE INDUSTRIES
//! LTD."). Everything downstream aggregates on the normalized form, so the
//! rules here are deliberately fixed: same input, same output, across runs
//! and machines.

use once_cell::sync::Lazy;
use regex::Regex;

/// Legal-suffix patterns stripped from the end of company names, applied in
/// order. Each token may carry a trailing period.
static LEGAL_SUFFIXES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\s+Limited\s*$",
        r"(?i)\s+Ltd\.?\s*$",
        r"(?i)\s+Pvt\.?\s*$",
        r"(?i)\s+Private\s+Limited\s*$",
        r"(?i)\s+Pvt\.?\s+Ltd\.?\s*$",
        r"(?i)\s+Inc\.?\s*$",
        r"(?i)\s+Corporation\s*$",
        r"(?i)\s+Corp\.?\s*$",
        r"(?i)\s+Company\s*$",
        r"(?i)\s+Co\.?\s*$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static suffix pattern"))
    .collect()
});

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static pattern"));

/// First 1-3 digit number with optional decimals, as found in allocation
/// strings like "8.50%".
static PERCENT_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{1,3}(?:\.\d+)?").expect("static pattern"));

/// First run of digits, commas, and dots, as found in currency strings like
/// "NAV: ₹ 1,234.56".
static CURRENCY_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\d,.]+").expect("static pattern"));

/// Punctuation trimmed off the ends of a normalized name. Brackets are kept
/// so parenthesized qualifiers survive intact.
const EDGE_PUNCT: &[char] = &['.', ',', ';', ':', '\'', '"', '-', '_', '/'];

/// Normalize a company name for cross-fund aggregation.
///
/// Trims, strips legal suffixes ("Limited", "Ltd.", "Pvt Ltd", ...) from the
/// end, collapses whitespace runs, and removes stray punctuation from both
/// ends. Case is preserved. The whole pass repeats until the name stops
/// changing, so stacked suffixes collapse too and the operation is
/// idempotent.
///
/// A name that reduces to nothing (for instance a bare "Ltd") comes back as
/// its trimmed original so no holding silently disappears.
pub fn normalize_company_name(raw: &str) -> String {
    let original = raw.trim();
    let mut current = original.to_string();

    loop {
        let next = normalize_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }

    if current.is_empty() {
        original.to_string()
    } else {
        current
    }
}

fn normalize_pass(name: &str) -> String {
    let mut result = name.trim().to_string();

    for pattern in LEGAL_SUFFIXES.iter() {
        if let Some(m) = pattern.find(&result) {
            result.truncate(m.start());
        }
    }

    let result = result.trim_end_matches(|c: char| c == '.' || c.is_whitespace());
    let result = WHITESPACE_RUN.replace_all(result, " ");
    result.trim().trim_matches(EDGE_PUNCT).trim().to_string()
}

/// Extract a percentage value from text like "8.50%".
///
/// Returns the first `\d{1,3}(\.\d+)?` run as a number, or `0.0` when the
/// text carries no parseable value. Never fails.
pub fn parse_percentage(text: &str) -> f64 {
    PERCENT_NUMBER
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Extract a percentage as a fraction: "8.50%" becomes 0.085.
pub fn parse_percentage_as_fraction(text: &str) -> f64 {
    parse_percentage(text) / 100.0
}

/// Extract a currency amount from text like "₹ 1,234.56 Cr".
///
/// Takes the first run of digits, commas, and dots, drops the
/// thousands-separator commas, and parses the rest. Returns `0.0` for
/// missing or malformed values ("1.2.3" is malformed, not 1.2).
pub fn parse_currency(text: &str) -> f64 {
    CURRENCY_NUMBER
        .find(text)
        .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Instrument names excluded from aggregation.
///
/// Terms are upper-cased once at construction; a name is excluded when any
/// term occurs as a substring of its upper-cased form. This catches the
/// cash-equivalent rows ("CASH", "TREPS", "Net Receivables") that would
/// otherwise dominate weight rankings.
#[derive(Debug, Clone, Default)]
pub struct ExclusionList {
    terms: Vec<String>,
}

impl ExclusionList {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            terms: terms
                .into_iter()
                .map(|t| t.as_ref().trim().to_uppercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn is_excluded(&self, company: &str) -> bool {
        if self.terms.is_empty() {
            return false;
        }
        let upper = company.to_uppercase();
        self.terms.iter().any(|term| upper.contains(term))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_common_suffixes() {
        assert_eq!(normalize_company_name("Reliance Industries Ltd"), "Reliance Industries");
        assert_eq!(normalize_company_name("Infosys Limited"), "Infosys");
        assert_eq!(normalize_company_name("TCS Ltd."), "TCS");
        assert_eq!(normalize_company_name("ABC Private Limited"), "ABC");
        assert_eq!(normalize_company_name("ABC Pvt. Ltd."), "ABC");
        assert_eq!(normalize_company_name("Apple Inc."), "Apple");
        assert_eq!(normalize_company_name("Oracle Corporation"), "Oracle");
        assert_eq!(normalize_company_name("Intel Corp"), "Intel");
        assert_eq!(normalize_company_name("East India Company"), "East India");
        assert_eq!(normalize_company_name("Shipping Co."), "Shipping");
    }

    #[test]
    fn test_suffix_match_is_case_insensitive() {
        assert_eq!(normalize_company_name("RELIANCE INDUSTRIES LTD"), "RELIANCE INDUSTRIES");
        assert_eq!(normalize_company_name("hdfc bank limited"), "hdfc bank");
    }

    #[test]
    fn test_case_and_internal_punctuation_preserved() {
        assert_eq!(normalize_company_name("Larsen & Toubro Limited"), "Larsen & Toubro");
        assert_eq!(normalize_company_name("M&M Ltd."), "M&M");
        assert_eq!(normalize_company_name("Dr. Reddy's Laboratories Ltd."), "Dr. Reddy's Laboratories");
    }

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(normalize_company_name("  Reliance   Industries  Ltd  "), "Reliance Industries");
    }

    #[test]
    fn test_stacked_suffixes_collapse() {
        assert_eq!(normalize_company_name("Acme Ltd Ltd"), "Acme");
        assert_eq!(normalize_company_name("Acme Company Limited"), "Acme");
    }

    #[test]
    fn test_edge_punctuation_stripped() {
        assert_eq!(normalize_company_name("\"Bharti Airtel Ltd\""), "Bharti Airtel");
        assert_eq!(normalize_company_name("Tata Motors Ltd,"), "Tata Motors");
    }

    #[test]
    fn test_suffix_only_name_returns_original() {
        assert_eq!(normalize_company_name("Limited"), "Limited");
        assert_eq!(normalize_company_name("  Ltd.  "), "Ltd.");
        assert_eq!(normalize_company_name(""), "");
    }

    #[test]
    fn test_idempotent() {
        for raw in [
            "Reliance Industries Ltd",
            "Acme Ltd Ltd",
            "Tata Motors Ltd,",
            "Limited",
            "  spaced   out  Pvt. Ltd. ",
            "Larsen & Toubro Limited",
        ] {
            let once = normalize_company_name(raw);
            assert_eq!(normalize_company_name(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_untouched_names_pass_through() {
        assert_eq!(normalize_company_name("Tata Consultancy Services"), "Tata Consultancy Services");
        assert_eq!(normalize_company_name("3M India"), "3M India");
    }

    #[test]
    fn test_parse_percentage() {
        assert_eq!(parse_percentage("8.50%"), 8.5);
        assert_eq!(parse_percentage("8.50"), 8.5);
        assert_eq!(parse_percentage(" 12 % "), 12.0);
        assert_eq!(parse_percentage(""), 0.0);
        assert_eq!(parse_percentage("invalid%"), 0.0);
        assert_eq!(parse_percentage("N/A"), 0.0);
    }

    #[test]
    fn test_parse_percentage_as_fraction() {
        assert_eq!(parse_percentage_as_fraction("8.50%"), 0.085);
        assert_eq!(parse_percentage_as_fraction("no number"), 0.0);
    }

    #[test]
    fn test_parse_currency() {
        assert_eq!(parse_currency("₹ 1,234.56 Cr"), 1234.56);
        assert_eq!(parse_currency("123.45"), 123.45);
        assert_eq!(parse_currency("12,34,567"), 1234567.0);
        assert_eq!(parse_currency(""), 0.0);
        assert_eq!(parse_currency("N/A"), 0.0);
        assert_eq!(parse_currency("1.2.3"), 0.0);
    }

    #[test]
    fn test_exclusion_list() {
        let exclusions = ExclusionList::new(["CASH", "treps", "Net Receivables"]);
        assert!(exclusions.is_excluded("Cash"));
        assert!(exclusions.is_excluded("TREPS 91D"));
        assert!(exclusions.is_excluded("net receivables / (payables)"));
        assert!(!exclusions.is_excluded("Reliance Industries"));

        let empty = ExclusionList::default();
        assert!(!empty.is_excluded("Cash"));
    }
}
