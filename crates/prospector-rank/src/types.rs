//! Post-processing types.

use prospector_core::GeneratedQuery;
use serde::Serialize;

/// What each stage did to a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessReport {
    pub input: usize,
    pub too_short_dropped: usize,
    pub duplicates_removed: usize,
    pub include_filtered: usize,
    /// Queries that received at least one `-site:` clause.
    pub excludes_applied: usize,
    pub truncated: usize,
    /// How many queries short of `top_k` the output is.
    pub shortfall: usize,
}

/// Output of the post-processor.
#[derive(Debug, Clone)]
pub struct Processed {
    pub queries: Vec<GeneratedQuery>,
    pub report: ProcessReport,
}
