//! Diversity scoring and query analytics.
//!
//! The score is a weighted sum of four saturating sub-scores:
//! industry terms, geographic sub-areas, distinct structural patterns and
//! distinct mailbox providers. Weights and thresholds come from
//! [`CoverageWeights`].

use std::collections::{BTreeMap, HashSet};

use prospector_core::{
    CoverageLevel, CoverageWeights, GeneratedQuery, LocalityRecord, MarketContext,
    QueryAnalytics, EMAIL_PROVIDERS,
};

/// Pattern classes of a query, one per operator it uses; `plain` if none.
pub fn pattern_classes(query: &GeneratedQuery) -> Vec<&'static str> {
    let classes: Vec<&'static str> = query
        .pattern_signature
        .operators()
        .filter_map(|op| match op {
            "site:" => Some("site_targeted"),
            "filetype:" => Some("document_search"),
            "intitle:" => Some("title_search"),
            "inurl:" => Some("url_search"),
            "intext:" => Some("text_search"),
            _ => None,
        })
        .collect();
    if classes.is_empty() {
        return vec!["plain"];
    }
    classes
}

pub struct DiversityScorer {
    weights: CoverageWeights,
}

impl Default for DiversityScorer {
    fn default() -> Self {
        Self::new(CoverageWeights::default())
    }
}

impl DiversityScorer {
    pub fn new(weights: CoverageWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &CoverageWeights {
        &self.weights
    }

    /// Compute analytics for the final query list.
    pub fn analyze(
        &self,
        queries: &[GeneratedQuery],
        context: &MarketContext,
        locality: &LocalityRecord,
    ) -> QueryAnalytics {
        let lowered: Vec<String> = queries.iter().map(|q| q.text.to_lowercase()).collect();

        let email_provider_distribution = provider_distribution(&lowered);
        let mut pattern_distribution: BTreeMap<String, usize> = BTreeMap::new();
        for class in queries.iter().flat_map(pattern_classes) {
            *pattern_distribution.entry(class.to_string()).or_insert(0) += 1;
        }

        let distinct_signatures = queries
            .iter()
            .map(|q| &q.pattern_signature)
            .collect::<HashSet<_>>()
            .len();

        let diversity_score = self.score(
            context.industry_term_count(),
            locality.sub_area_count(),
            distinct_signatures,
            email_provider_distribution.len(),
        );

        QueryAnalytics {
            total_generated: queries.len(),
            unique_terms_used: unique_terms(&lowered),
            geographic_coverage: geographic_coverage(&lowered, context, locality),
            email_provider_distribution,
            pattern_distribution,
            estimated_coverage: self.level(diversity_score),
            diversity_score,
        }
    }

    /// Weighted 0–100 score, rounded to one decimal.
    pub fn score(
        &self,
        industry_terms: usize,
        sub_areas: usize,
        distinct_signatures: usize,
        distinct_providers: usize,
    ) -> f64 {
        let w = &self.weights;
        let total = saturate(industry_terms, w.industry_saturation) * w.industry_weight
            + saturate(sub_areas, w.geography_saturation) * w.geography_weight
            + saturate(distinct_signatures, w.structure_saturation) * w.structure_weight
            + saturate(distinct_providers, EMAIL_PROVIDERS.len() as f64) * w.provider_weight;
        (total * 10.0).round() / 10.0
    }

    pub fn level(&self, score: f64) -> CoverageLevel {
        let w = &self.weights;
        if score >= w.excellent_threshold {
            CoverageLevel::Excellent
        } else if score >= w.good_threshold {
            CoverageLevel::Good
        } else if score >= w.fair_threshold {
            CoverageLevel::Fair
        } else {
            CoverageLevel::Limited
        }
    }
}

fn saturate(count: usize, saturation: f64) -> f64 {
    if saturation <= 0.0 {
        return 1.0;
    }
    (count as f64 / saturation).min(1.0)
}

/// Known provider → number of queries mentioning it; zero counts omitted.
fn provider_distribution(lowered: &[String]) -> BTreeMap<String, usize> {
    EMAIL_PROVIDERS
        .iter()
        .filter_map(|provider| {
            let count = lowered.iter().filter(|q| q.contains(provider)).count();
            (count > 0).then(|| (provider.to_string(), count))
        })
        .collect()
}

/// Distinct whitespace tokens with quotes stripped.
fn unique_terms(lowered: &[String]) -> usize {
    lowered
        .iter()
        .flat_map(|q| q.split_whitespace())
        .map(|t| t.trim_matches(|c| c == '"' || c == '\''))
        .filter(|t| !t.is_empty())
        .collect::<HashSet<_>>()
        .len()
}

/// Distinct locality names that appear in at least one query.
fn geographic_coverage(lowered: &[String], context: &MarketContext, locality: &LocalityRecord) -> usize {
    let names: HashSet<String> = locality
        .area_names()
        .chain(locality.local_names.iter().map(String::as_str))
        .chain(context.location_areas.iter().map(String::as_str))
        .map(|n| n.trim().to_lowercase())
        .filter(|n| !n.is_empty())
        .collect();

    names
        .iter()
        .filter(|name| lowered.iter().any(|q| q.contains(name.as_str())))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(types: &[&str], variations: &[&str]) -> MarketContext {
        MarketContext {
            primary_business_types: types.iter().map(|s| s.to_string()).collect(),
            keyword_variations: variations.iter().map(|s| s.to_string()).collect(),
            location_areas: vec!["Austin".into(), "Greater Austin".into(), "Austin Area".into()],
            search_patterns: vec![],
            is_b2b: false,
            suggested_email_domains: vec![],
        }
    }

    fn locality(neighborhoods: &[&str], metro: &[&str]) -> LocalityRecord {
        LocalityRecord {
            primary_city: "Austin".into(),
            neighborhoods: neighborhoods.iter().map(|s| s.to_string()).collect(),
            metro_areas: metro.iter().map(|s| s.to_string()).collect(),
            local_names: vec!["Austin".into()],
            country_code: "US".into(),
            languages: vec!["en".into()],
            business_tlds: vec![".com".into()],
        }
    }

    fn batch(texts: &[&str]) -> Vec<GeneratedQuery> {
        texts.iter().map(|t| GeneratedQuery::new(*t)).collect()
    }

    #[test]
    fn test_level_thresholds() {
        let scorer = DiversityScorer::default();
        assert_eq!(scorer.level(80.0), CoverageLevel::Excellent);
        assert_eq!(scorer.level(79.9), CoverageLevel::Good);
        assert_eq!(scorer.level(60.0), CoverageLevel::Good);
        assert_eq!(scorer.level(40.0), CoverageLevel::Fair);
        assert_eq!(scorer.level(39.9), CoverageLevel::Limited);
    }

    #[test]
    fn test_score_saturates() {
        let scorer = DiversityScorer::default();
        assert_eq!(scorer.score(10, 5, 5, 6), 100.0);
        assert_eq!(scorer.score(50, 50, 50, 50), 100.0);
        assert_eq!(scorer.score(0, 0, 0, 0), 0.0);
        // 15 + 10 + 15 + 13.3
        assert_eq!(scorer.score(5, 2, 3, 4), 53.3);
    }

    #[test]
    fn test_custom_weights() {
        let scorer = DiversityScorer::new(CoverageWeights {
            industry_weight: 100.0,
            geography_weight: 0.0,
            structure_weight: 0.0,
            provider_weight: 0.0,
            ..CoverageWeights::default()
        });
        assert_eq!(scorer.score(5, 5, 5, 6), 50.0);
    }

    #[test]
    fn test_analytics_for_fallback_batch() {
        let queries = batch(&[
            r#"site:.com "bakery" "Austin" "@gmail.com""#,
            r#""bakery company" "Greater Austin" "@yahoo.com" contact"#,
            r#"filetype:pdf "bakery firm" "Austin Area" "@outlook.com""#,
            r#"filetype:pdf "bakery" "Austin Area" "@yahoo.com""#,
            r#"site:.com "bakery company" "Austin" "@hotmail.com""#,
        ]);
        let ctx = context(&["company", "firm", "services", "agency"], &["bakery"]);
        let loc = locality(&[], &["Austin", "Greater Austin"]);

        let analytics = DiversityScorer::default().analyze(&queries, &ctx, &loc);
        assert_eq!(analytics.total_generated, 5);
        assert_eq!(analytics.estimated_coverage, CoverageLevel::Fair);
        assert_eq!(analytics.diversity_score, 53.3);
        assert_eq!(analytics.email_provider_distribution.get("yahoo.com"), Some(&2));
        assert_eq!(analytics.email_provider_distribution.get("aol.com"), None);
        assert_eq!(analytics.pattern_distribution.get("site_targeted"), Some(&2));
        assert_eq!(analytics.pattern_distribution.get("document_search"), Some(&2));
        assert_eq!(analytics.pattern_distribution.get("plain"), Some(&1));
        assert_eq!(analytics.geographic_coverage, 3);
    }

    #[test]
    fn test_unique_terms_strip_quotes() {
        let lowered = vec![
            r#""bakery" "austin" contact"#.to_string(),
            r#"bakery austin "contact""#.to_string(),
        ];
        assert_eq!(unique_terms(&lowered), 3);
    }

    #[test]
    fn test_pattern_classes() {
        let q = batch(&[
            r#"intitle:"bakery" site:.com "@gmail.com""#,
            r#"inurl:contact "bakery""#,
            r#"intext:"bakery" "@gmail.com""#,
        ]);
        assert_eq!(pattern_classes(&q[0]), vec!["title_search", "site_targeted"]);
        assert_eq!(pattern_classes(&q[1]), vec!["url_search"]);
        assert_eq!(pattern_classes(&q[2]), vec!["text_search"]);
        assert_eq!(pattern_classes(&GeneratedQuery::new(r#""bakery" contact"#)), vec!["plain"]);
    }

    #[test]
    fn test_distribution_counts_every_operator() {
        let queries = batch(&[
            r#"site:.com intitle:"bakery" "@gmail.com""#,
            r#"site:.org "bakery" "@gmail.com""#,
            r#""bakery" "Austin" contact"#,
        ]);
        let analytics = DiversityScorer::default().analyze(
            &queries,
            &context(&["company"], &["bakery"]),
            &locality(&[], &["Austin"]),
        );
        assert_eq!(analytics.pattern_distribution.get("site_targeted"), Some(&2));
        assert_eq!(analytics.pattern_distribution.get("title_search"), Some(&1));
        assert_eq!(analytics.pattern_distribution.get("plain"), Some(&1));
        assert_eq!(analytics.total_generated, 3);
    }

    #[test]
    fn test_empty_batch() {
        let analytics = DiversityScorer::default().analyze(
            &[],
            &context(&["company"], &["bakery"]),
            &locality(&[], &[]),
        );
        assert_eq!(analytics.total_generated, 0);
        assert!(analytics.email_provider_distribution.is_empty());
        assert_eq!(analytics.estimated_coverage, CoverageLevel::Limited);
    }
}
