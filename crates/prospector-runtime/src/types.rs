//! Runtime types.

use prospector_core::{LocalityRecord, MarketContext, QueryAnalytics};
use serde::Serialize;

/// How a response was produced.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseMeta {
    pub market_context: MarketContext,
    pub locality: LocalityRecord,
    pub execution_time_ms: u64,
    /// `None` when the template fallback produced the batch.
    pub model_used: Option<String>,
    pub fallback_used: bool,
    pub context_fallback_used: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    /// Queries added by padding after post-processing.
    pub padded: usize,
    /// Queries still missing after padding.
    pub shortfall: usize,
}

/// Pipeline output returned to callers.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub queries: Vec<String>,
    pub analytics: QueryAnalytics,
    pub meta: ResponseMeta,
    pub request_id: String,
}

/// Runtime status information.
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeStatus {
    /// Active text-generation model, if any.
    pub model: Option<String>,
    pub context_provider: bool,
    pub cache_entries: usize,
}
