//! Request, context and analytics types shared by every pipeline stage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{RequestLimits, DEFAULT_TOP_K};
use crate::signature::PatternSignature;
use crate::{Error, Result};

/// Incoming query-generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Business category, e.g. "bakery" or "FinTech".
    pub industry: String,
    /// Region name, e.g. "Austin" or "San Francisco".
    pub region: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// At least one of these must appear in every returned query.
    #[serde(default)]
    pub includes: Vec<String>,
    /// Sites to exclude via `-site:` clauses.
    #[serde(default)]
    pub excludes: Vec<String>,
    /// Ask the model to stick to personal mailbox providers.
    #[serde(default)]
    pub personal_only: bool,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

impl QueryRequest {
    pub fn new(industry: impl Into<String>, region: impl Into<String>, top_k: usize) -> Self {
        Self {
            industry: industry.into(),
            region: region.into(),
            top_k,
            includes: Vec::new(),
            excludes: Vec::new(),
            personal_only: false,
        }
    }

    pub fn with_includes(mut self, includes: &[&str]) -> Self {
        self.includes = includes.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_excludes(mut self, excludes: &[&str]) -> Self {
        self.excludes = excludes.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Check the request against the boundary limits.
    pub fn validate(&self, limits: &RequestLimits) -> Result<()> {
        for (name, value) in [("industry", &self.industry), ("region", &self.region)] {
            if value.trim().is_empty() {
                return Err(Error::Validation(format!("{} must not be empty", name)));
            }
            if value.chars().count() > limits.max_field_len {
                return Err(Error::Validation(format!(
                    "{} must be at most {} characters",
                    name, limits.max_field_len
                )));
            }
        }

        if self.top_k == 0 || self.top_k > limits.max_top_k {
            return Err(Error::Validation(format!(
                "top_k must be between 1 and {}",
                limits.max_top_k
            )));
        }

        for (name, terms) in [("includes", &self.includes), ("excludes", &self.excludes)] {
            if terms.len() > limits.max_filter_terms {
                return Err(Error::Validation(format!(
                    "{} accepts at most {} terms",
                    name, limits.max_filter_terms
                )));
            }
            if let Some(term) = terms
                .iter()
                .find(|t| t.chars().count() > limits.max_filter_term_len)
            {
                return Err(Error::Validation(format!(
                    "{} term too long ({} > {} characters)",
                    name,
                    term.chars().count(),
                    limits.max_filter_term_len
                )));
            }
        }

        Ok(())
    }

    /// Include terms with blanks removed.
    pub fn include_terms(&self) -> impl Iterator<Item = &str> {
        self.includes.iter().map(|t| t.trim()).filter(|t| !t.is_empty())
    }

    /// Exclude terms with blanks removed.
    pub fn exclude_terms(&self) -> impl Iterator<Item = &str> {
        self.excludes.iter().map(|t| t.trim()).filter(|t| !t.is_empty())
    }

    /// Whether `text` mentions at least one include term, ignoring case.
    /// Trivially true when there are no include terms.
    pub fn matches_includes(&self, text: &str) -> bool {
        let mut terms = self.include_terms().peekable();
        if terms.peek().is_none() {
            return true;
        }
        let text = text.to_lowercase();
        terms.any(|term| text.contains(&term.to_lowercase()))
    }
}

/// Resolved geographic metadata for a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalityRecord {
    pub primary_city: String,
    pub neighborhoods: Vec<String>,
    pub metro_areas: Vec<String>,
    pub local_names: Vec<String>,
    /// ISO 3166 alpha-2.
    pub country_code: String,
    pub languages: Vec<String>,
    /// Domain suffixes local businesses use, most common first.
    pub business_tlds: Vec<String>,
}

impl LocalityRecord {
    /// Primary city, neighborhoods and metro areas, in that order.
    pub fn area_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary_city.as_str())
            .chain(self.neighborhoods.iter().map(String::as_str))
            .chain(self.metro_areas.iter().map(String::as_str))
    }

    /// Number of sub-areas (neighborhoods plus metro areas).
    pub fn sub_area_count(&self) -> usize {
        self.neighborhoods.len() + self.metro_areas.len()
    }
}

/// Market signals for an (industry, region) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketContext {
    pub primary_business_types: Vec<String>,
    pub keyword_variations: Vec<String>,
    pub location_areas: Vec<String>,
    pub search_patterns: Vec<String>,
    pub is_b2b: bool,
    /// Mailbox domains with a leading `@`, e.g. `@gmail.com`.
    pub suggested_email_domains: Vec<String>,
}

impl MarketContext {
    /// Distinct business types and keyword variations, case-insensitive.
    pub fn industry_term_count(&self) -> usize {
        let mut seen: Vec<String> = Vec::new();
        for term in self
            .primary_business_types
            .iter()
            .chain(self.keyword_variations.iter())
        {
            let lower = term.to_lowercase();
            if !seen.contains(&lower) {
                seen.push(lower);
            }
        }
        seen.len()
    }
}

/// A query string with its structural fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedQuery {
    pub text: String,
    pub pattern_signature: PatternSignature,
}

impl GeneratedQuery {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let pattern_signature = PatternSignature::of(&text);
        Self {
            text,
            pattern_signature,
        }
    }
}

/// Heuristic coverage label derived from the diversity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CoverageLevel {
    Limited,
    Fair,
    Good,
    Excellent,
}

impl std::fmt::Display for CoverageLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Excellent => write!(f, "Excellent (80%+ coverage)"),
            Self::Good => write!(f, "Good (60-80% coverage)"),
            Self::Fair => write!(f, "Fair (40-60% coverage)"),
            Self::Limited => write!(f, "Limited (<40% coverage)"),
        }
    }
}

/// Statistics about the final query list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryAnalytics {
    pub total_generated: usize,
    pub unique_terms_used: usize,
    pub geographic_coverage: usize,
    pub email_provider_distribution: BTreeMap<String, usize>,
    pub pattern_distribution: BTreeMap<String, usize>,
    pub estimated_coverage: CoverageLevel,
    /// 0–100.
    pub diversity_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults_from_json() {
        let req: QueryRequest =
            serde_json::from_str(r#"{"industry": "bakery", "region": "Austin"}"#).unwrap();
        assert_eq!(req.top_k, DEFAULT_TOP_K);
        assert!(req.includes.is_empty());
        assert!(req.excludes.is_empty());
        assert!(!req.personal_only);
    }

    #[test]
    fn test_validate_accepts_valid_request() {
        let req = QueryRequest::new("bakery", "Austin", 5).with_excludes(&["yelp.com"]);
        assert!(req.validate(&RequestLimits::default()).is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_bounds() {
        let limits = RequestLimits::default();
        assert!(QueryRequest::new("  ", "Austin", 5).validate(&limits).is_err());
        assert!(QueryRequest::new("bakery", "", 5).validate(&limits).is_err());
        assert!(QueryRequest::new("bakery", "Austin", 0).validate(&limits).is_err());
        assert!(QueryRequest::new("bakery", "Austin", 101).validate(&limits).is_err());

        let many: Vec<String> = (0..21).map(|i| format!("term{}", i)).collect();
        let mut req = QueryRequest::new("bakery", "Austin", 5);
        req.includes = many;
        assert!(matches!(req.validate(&limits), Err(Error::Validation(_))));

        let long = "x".repeat(101);
        let req = QueryRequest::new("bakery", "Austin", 5).with_excludes(&[long.as_str()]);
        assert!(req.validate(&limits).is_err());
    }

    #[test]
    fn test_blank_filter_terms_are_skipped() {
        let req = QueryRequest::new("bakery", "Austin", 5).with_includes(&["organic", " ", ""]);
        assert_eq!(req.include_terms().collect::<Vec<_>>(), vec!["organic"]);
    }

    #[test]
    fn test_matches_includes() {
        let req = QueryRequest::new("bakery", "Austin", 5);
        assert!(req.matches_includes("anything at all"));

        let req = req.with_includes(&["Organic", "vegan"]);
        assert!(req.matches_includes(r#""organic bakery" "@gmail.com""#));
        assert!(req.matches_includes("VEGAN cafe"));
        assert!(!req.matches_includes("gluten free bakery"));
    }

    #[test]
    fn test_industry_term_count_is_case_insensitive() {
        let ctx = MarketContext {
            primary_business_types: vec!["bakery".into(), "shop".into()],
            keyword_variations: vec!["Bakery".into(), "artisan bread".into()],
            location_areas: vec![],
            search_patterns: vec![],
            is_b2b: false,
            suggested_email_domains: vec![],
        };
        assert_eq!(ctx.industry_term_count(), 3);
    }

    #[test]
    fn test_coverage_levels_order() {
        assert!(CoverageLevel::Excellent > CoverageLevel::Good);
        assert!(CoverageLevel::Fair > CoverageLevel::Limited);
        assert_eq!(CoverageLevel::Fair.to_string(), "Fair (40-60% coverage)");
    }
}
