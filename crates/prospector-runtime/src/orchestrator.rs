//! Orchestrator: runs the query-synthesis pipeline per request.

use std::sync::Arc;
use std::time::{Duration, Instant};

use prospector_context::{ContextCache, ContextResolver, SearchProvider};
use prospector_core::{
    GeneratedQuery, LocalityRecord, MarketContext, ProspectorConfig, QueryRequest, RequestLimits,
    Result,
};
use prospector_generate::{GenerationSource, PromptTemplate, QueryGenerator};
use prospector_geo::GeoResolver;
use prospector_llm::TextGenerator;
use prospector_rank::{apply_excludes, DiversityScorer, PostProcessor};
use tracing::{info, info_span, Instrument};

use crate::types::*;

/// Short request id: the first 8 hex characters of a v4 UUID.
pub fn new_request_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Top-level orchestrator that owns every pipeline stage.
pub struct Orchestrator {
    context: ContextResolver,
    generator: QueryGenerator,
    scorer: DiversityScorer,
    limits: RequestLimits,
}

impl Orchestrator {
    pub fn new(
        context: ContextResolver,
        generator: QueryGenerator,
        scorer: DiversityScorer,
        limits: RequestLimits,
    ) -> Self {
        Self {
            context,
            generator,
            scorer,
            limits,
        }
    }

    /// Wire the pipeline from configuration and optional external services.
    pub fn from_config(
        config: &ProspectorConfig,
        search: Option<Arc<dyn SearchProvider>>,
        model: Option<Arc<dyn TextGenerator>>,
    ) -> Result<Self> {
        let cache = Arc::new(ContextCache::from_settings(&config.cache));
        let context = ContextResolver::new(search, cache, config.provider_timeout);

        let mut generator = QueryGenerator::new(model, config.provider_timeout);
        if let Some(path) = &config.prompt_template_path {
            generator = generator.with_template(PromptTemplate::from_file(path)?);
            info!("Loaded prompt template from {}", path.display());
        }

        info!(
            "Orchestrator initialized: model={}, context_provider={}, timeout={}s",
            generator.model_name().unwrap_or("none"),
            context.has_provider(),
            config.provider_timeout.as_secs()
        );

        Ok(Self::new(
            context,
            generator,
            DiversityScorer::new(config.coverage.clone()),
            config.limits.clone(),
        ))
    }

    pub fn limits(&self) -> &RequestLimits {
        &self.limits
    }

    pub fn status(&self) -> RuntimeStatus {
        RuntimeStatus {
            model: self.generator.model_name().map(str::to_string),
            context_provider: self.context.has_provider(),
            cache_entries: self.context.cache().len(),
        }
    }

    /// Locality record for a region.
    pub fn resolve_geography(&self, region: &str) -> LocalityRecord {
        GeoResolver::resolve(region)
    }

    /// Market context for an (industry, region) pair, through the cache.
    pub async fn resolve_context(&self, industry: &str, region: &str) -> MarketContext {
        self.context.resolve(industry, region).await
    }

    /// Validate the request, then run the full pipeline.
    ///
    /// Only validation can fail; every provider problem is absorbed by a
    /// fallback and reported in the response meta.
    pub async fn build(&self, request: &QueryRequest) -> Result<QueryResponse> {
        request.validate(&self.limits)?;

        let request_id = new_request_id();
        let span = info_span!("build", request_id = %request_id);
        let response = self.run(request, request_id).instrument(span).await;
        Ok(response)
    }

    async fn run(&self, request: &QueryRequest, request_id: String) -> QueryResponse {
        let start = Instant::now();
        info!(
            "Building queries: industry={:?}, region={:?}, top_k={}",
            request.industry, request.region, request.top_k
        );

        // Geography and context are independent
        let geography = async { GeoResolver::resolve(&request.region) };
        let (locality, resolved) = tokio::join!(
            geography,
            self.context
                .resolve_detailed(&request.industry, &request.region)
        );
        let context = &resolved.context;

        let generation = self.generator.generate(request, context, &locality).await;
        let processed = PostProcessor::process(generation.queries.clone(), request);
        let mut queries = processed.queries;

        let mut padded = 0;
        if processed.report.shortfall > 0 {
            let extra = QueryGenerator::pad(
                request,
                context,
                &locality,
                &queries,
                processed.report.shortfall,
                generation.next_slot,
            );
            padded = extra.len();
            queries.extend(
                extra
                    .iter()
                    .map(|q| GeneratedQuery::new(apply_excludes(&q.text, request))),
            );
        }

        let analytics = self.scorer.analyze(&queries, context, &locality);
        let (model_used, fallback_reason) = match &generation.source {
            GenerationSource::Model { model } => (Some(model.clone()), None),
            GenerationSource::Fallback { reason } => (None, Some(reason.clone())),
        };

        let meta = ResponseMeta {
            market_context: resolved.context.clone(),
            locality,
            execution_time_ms: elapsed_ms(start.elapsed()),
            model_used,
            fallback_used: generation.is_fallback(),
            context_fallback_used: resolved.is_fallback(),
            fallback_reason,
            padded,
            shortfall: request.top_k.saturating_sub(queries.len()),
        };

        info!(
            "Built {} queries in {}ms: coverage={}, score={}, fallback={}, padded={}",
            queries.len(),
            meta.execution_time_ms,
            analytics.estimated_coverage,
            analytics.diversity_score,
            meta.fallback_used,
            padded
        );

        QueryResponse {
            queries: queries.into_iter().map(|q| q.text).collect(),
            analytics,
            meta,
            request_id,
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn elapsed_ms(elapsed: Duration) -> u64 {
    elapsed.as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use prospector_context::{SearchRequest, SearchResultSet};
    use prospector_core::{CoverageLevel, Error};
    use prospector_llm::{Completion, GenerationParams};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSearch {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingSearch {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl SearchProvider for CountingSearch {
        async fn search(&self, _request: &SearchRequest) -> Result<SearchResultSet> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::ProviderUnavailable("503".into()));
            }
            Ok(SearchResultSet::default())
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    struct CannedModel(String);

    #[async_trait]
    impl TextGenerator for CannedModel {
        async fn complete(&self, _prompt: &str, _params: &GenerationParams) -> Result<Completion> {
            Ok(Completion {
                text: self.0.clone(),
                model: "canned-1".into(),
                tokens_used: 1,
            })
        }

        fn model(&self) -> &str {
            "canned-1"
        }
    }

    fn orchestrator(
        search: Option<Arc<dyn SearchProvider>>,
        model: Option<Arc<dyn TextGenerator>>,
    ) -> Orchestrator {
        let config = ProspectorConfig {
            provider_timeout: Duration::from_millis(200),
            ..ProspectorConfig::default()
        };
        Orchestrator::from_config(&config, search, model).unwrap()
    }

    fn matches_fallback_template(query: &str) -> bool {
        (query.starts_with("site:") || query.starts_with("filetype:pdf ") || query.ends_with(" contact"))
            && query.contains("\"@")
    }

    #[tokio::test]
    async fn test_bakery_austin_with_providers_down() {
        let search = CountingSearch::new(true);
        let orch = orchestrator(Some(search.clone()), None);
        let request = QueryRequest::new("bakery", "Austin", 5);

        let response = orch.build(&request).await.unwrap();
        assert_eq!(response.queries.len(), 5);
        assert!(response.queries.iter().all(|q| matches_fallback_template(q)), "{:?}", response.queries);
        assert!(response.meta.fallback_used);
        assert!(response.meta.context_fallback_used);
        assert_eq!(response.meta.shortfall, 0);
        assert_eq!(response.analytics.total_generated, 5);
        assert!(matches!(
            response.analytics.estimated_coverage,
            CoverageLevel::Fair | CoverageLevel::Limited
        ));
        assert_eq!(response.request_id.len(), 8);
        assert_eq!(search.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fallback_path_reaches_top_k_for_every_size() {
        let orch = orchestrator(None, None);
        for top_k in [1, 2, 3, 7, 15, 30, 40, 60, 100] {
            let response = orch
                .build(&QueryRequest::new("dental clinic", "Brooklyn", top_k))
                .await
                .unwrap();
            assert_eq!(response.queries.len(), top_k);
            assert_eq!(response.meta.shortfall, 0);
        }
    }

    #[tokio::test]
    async fn test_fallback_past_sequence_period_repeats_slots() {
        // 5 terms, 3 locations, 4 providers, 3 tlds, 3 templates: 60 distinct slots
        let orch = orchestrator(None, None);
        let response = orch
            .build(&QueryRequest::new("bakery", "Austin", 100))
            .await
            .unwrap();
        assert_eq!(response.queries.len(), 100);
        assert_eq!(response.meta.padded, 97);

        let mut distinct = response.queries.clone();
        distinct.sort();
        distinct.dedup();
        assert_eq!(distinct.len(), 60);
    }

    #[tokio::test]
    async fn test_excludes_reach_padded_queries() {
        let orch = orchestrator(None, None);
        let request = QueryRequest::new("bakery", "Austin", 6).with_excludes(&["yelp.com"]);
        let response = orch.build(&request).await.unwrap();
        assert_eq!(response.queries.len(), 6);
        assert!(response.meta.padded > 0);
        assert!(response.queries.iter().all(|q| q.ends_with(" -site:yelp.com")));
    }

    #[tokio::test]
    async fn test_includes_filter_model_batch() {
        let reply = r#"[
            "site:.com \"organic bakery\" \"@gmail.com\"",
            "filetype:pdf \"bakery\" \"@gmail.com\"",
            "intitle:\"bakery\" \"@gmail.com\"",
            "inurl:contact \"bakery\" \"@gmail.com\"",
            "intext:\"Organic\" \"bakery\" \"Austin\"",
            "\"bakery\" \"Austin\" \"@gmail.com\"",
            "\"bakery\" \"Austin\" \"@bakers.org\"",
            "\"bakery\" \"Austin\" contact"
        ]"#;
        let orch = orchestrator(None, Some(Arc::new(CannedModel(reply.into()))));
        let request = QueryRequest::new("bakery", "Austin", 8).with_includes(&["organic"]);

        let response = orch.build(&request).await.unwrap();
        assert_eq!(response.meta.model_used.as_deref(), Some("canned-1"));
        assert_eq!(
            response.queries,
            vec![
                r#"site:.com "organic bakery" "@gmail.com""#,
                r#"intext:"Organic" "bakery" "Austin""#,
            ]
        );
        assert_eq!(response.meta.shortfall, 6);
    }

    #[tokio::test]
    async fn test_context_is_cached_across_requests() {
        let search = CountingSearch::new(false);
        let orch = orchestrator(Some(search.clone()), None);

        let first = orch.resolve_context("bakery", "Austin").await;
        let second = orch.resolve_context("Bakery", "AUSTIN").await;
        assert_eq!(first, second);
        assert_eq!(search.calls.load(Ordering::SeqCst), 1);
        assert_eq!(orch.status().cache_entries, 1);
    }

    #[tokio::test]
    async fn test_invalid_request_is_rejected() {
        let orch = orchestrator(None, None);
        let err = orch
            .build(&QueryRequest::new("bakery", "Austin", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_resolve_geography() {
        let orch = orchestrator(None, None);
        let record = orch.resolve_geography("San Francisco");
        assert_eq!(record.business_tlds, vec![".com", ".org", ".net"]);
        assert!(!record.neighborhoods.is_empty());
    }

    #[test]
    fn test_request_id_shape() {
        let id = new_request_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
