//! Post-processing pipeline execution.

use std::collections::HashSet;

use prospector_core::{GeneratedQuery, PatternSignature, QueryRequest};
use tracing::{debug, info};

use crate::types::*;

/// Queries shorter than this (after trimming) are dropped.
pub const MIN_QUERY_LEN: usize = 10;

/// Post-processor that runs the cleanup stages over a generated batch.
pub struct PostProcessor;

impl PostProcessor {
    /// Run every stage. Running it again on its own output is a no-op.
    pub fn process(queries: Vec<GeneratedQuery>, request: &QueryRequest) -> Processed {
        let mut report = ProcessReport {
            input: queries.len(),
            ..Default::default()
        };

        // Stage 0: Trim and drop fragments
        let queries = Self::clean(queries, &mut report);

        // Stage 1: One query per structural pattern
        let queries = Self::deduplicate(queries, &mut report);

        // Stage 2: Include filter
        let queries = Self::filter_includes(queries, request, &mut report);

        // Stage 3: Exclusion clauses
        let mut queries = Self::augment_excludes(queries, request, &mut report);

        // Stage 4: Length reconciliation
        if queries.len() > request.top_k {
            report.truncated = queries.len() - request.top_k;
            queries.truncate(request.top_k);
        }
        report.shortfall = request.top_k - queries.len();

        info!(
            "Post-processing complete: in={}, short={}, dupes={}, filtered={}, out={}, shortfall={}",
            report.input,
            report.too_short_dropped,
            report.duplicates_removed,
            report.include_filtered,
            queries.len(),
            report.shortfall
        );

        Processed { queries, report }
    }

    fn clean(queries: Vec<GeneratedQuery>, report: &mut ProcessReport) -> Vec<GeneratedQuery> {
        let before = queries.len();
        let cleaned: Vec<GeneratedQuery> = queries
            .into_iter()
            .filter_map(|q| {
                let text = q.text.trim();
                if text.chars().count() < MIN_QUERY_LEN {
                    return None;
                }
                if text.len() == q.text.len() {
                    Some(q)
                } else {
                    Some(GeneratedQuery::new(text))
                }
            })
            .collect();
        report.too_short_dropped = before - cleaned.len();
        cleaned
    }

    /// Keep the first query per pattern signature.
    fn deduplicate(queries: Vec<GeneratedQuery>, report: &mut ProcessReport) -> Vec<GeneratedQuery> {
        let before = queries.len();
        let mut seen: HashSet<PatternSignature> = HashSet::new();
        let unique: Vec<GeneratedQuery> = queries
            .into_iter()
            .filter(|q| seen.insert(q.pattern_signature.clone()))
            .collect();
        report.duplicates_removed = before - unique.len();
        if report.duplicates_removed > 0 {
            debug!("Removed {} structural duplicates", report.duplicates_removed);
        }
        unique
    }

    fn filter_includes(
        queries: Vec<GeneratedQuery>,
        request: &QueryRequest,
        report: &mut ProcessReport,
    ) -> Vec<GeneratedQuery> {
        let before = queries.len();
        let kept: Vec<GeneratedQuery> = queries
            .into_iter()
            .filter(|q| request.matches_includes(&q.text))
            .collect();
        report.include_filtered = before - kept.len();
        kept
    }

    fn augment_excludes(
        queries: Vec<GeneratedQuery>,
        request: &QueryRequest,
        report: &mut ProcessReport,
    ) -> Vec<GeneratedQuery> {
        queries
            .into_iter()
            .map(|q| {
                let text = apply_excludes(&q.text, request);
                if text == q.text {
                    q
                } else {
                    report.excludes_applied += 1;
                    GeneratedQuery::new(text)
                }
            })
            .collect()
    }
}

/// Append `-site:{term}` for every exclude term not already in `text`.
pub fn apply_excludes(text: &str, request: &QueryRequest) -> String {
    let mut out = text.to_string();
    for term in request.exclude_terms() {
        let clause = format!("-site:{}", term);
        if !out.to_lowercase().contains(&clause.to_lowercase()) {
            out.push(' ');
            out.push_str(&clause);
        }
    }
    out
}
