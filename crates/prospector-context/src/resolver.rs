//! Cached market-context resolution.

use std::sync::Arc;
use std::time::Duration;

use prospector_core::{Error, MarketContext, Result};
use tracing::{debug, info, warn};

use crate::cache::{cache_key, ContextCache};
use crate::extract;
use crate::provider::{SearchProvider, SearchRequest};

/// Result-count cap for the context search.
pub const CONTEXT_RESULT_LIMIT: usize = 10;

/// Where a resolved context came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextSource {
    Cache,
    Provider,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct ResolvedContext {
    pub context: MarketContext,
    pub source: ContextSource,
}

impl ResolvedContext {
    pub fn is_fallback(&self) -> bool {
        self.source == ContextSource::Fallback
    }
}

/// Resolves market context through the cache and an optional search provider.
///
/// Resolution is total: provider errors, timeouts and a missing provider all
/// produce the generic fallback context, which is never cached.
pub struct ContextResolver {
    provider: Option<Arc<dyn SearchProvider>>,
    cache: Arc<ContextCache>,
    timeout: Duration,
}

impl ContextResolver {
    pub fn new(
        provider: Option<Arc<dyn SearchProvider>>,
        cache: Arc<ContextCache>,
        timeout: Duration,
    ) -> Self {
        if provider.is_none() {
            info!("No search provider configured, context resolution is fallback-only");
        }
        Self {
            provider,
            cache,
            timeout,
        }
    }

    pub fn cache(&self) -> &Arc<ContextCache> {
        &self.cache
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn resolve(&self, keyword: &str, location: &str) -> MarketContext {
        self.resolve_detailed(keyword, location).await.context
    }

    /// Resolve and report the context's source.
    pub async fn resolve_detailed(&self, keyword: &str, location: &str) -> ResolvedContext {
        let key = cache_key(keyword, location);
        if let Some(context) = self.cache.get(&key) {
            debug!("Context cache hit: {}", key);
            return ResolvedContext {
                context,
                source: ContextSource::Cache,
            };
        }

        let Some(provider) = self.provider.as_ref() else {
            return Self::fallback(keyword, location);
        };

        match self.fetch(provider.as_ref(), keyword, location).await {
            Ok(context) => {
                self.cache.put(key, context.clone());
                ResolvedContext {
                    context,
                    source: ContextSource::Provider,
                }
            }
            Err(e) => {
                warn!(
                    "Context provider {} failed for {:?}: {}. Using fallback context.",
                    provider.name(),
                    key,
                    e
                );
                Self::fallback(keyword, location)
            }
        }
    }

    async fn fetch(
        &self,
        provider: &dyn SearchProvider,
        keyword: &str,
        location: &str,
    ) -> Result<MarketContext> {
        let request = SearchRequest {
            query: format!("{} companies businesses {}", keyword.trim(), location.trim()),
            location: location.trim().to_string(),
            limit: CONTEXT_RESULT_LIMIT,
        };
        debug!("Fetching context from {}: {:?}", provider.name(), request.query);

        let results = tokio::time::timeout(self.timeout, provider.search(&request))
            .await
            .map_err(|_| {
                Error::ProviderUnavailable(format!(
                    "{} timed out after {}s",
                    provider.name(),
                    self.timeout.as_secs()
                ))
            })??;

        Ok(extract::context_from_results(&results, keyword, location))
    }

    fn fallback(keyword: &str, location: &str) -> ResolvedContext {
        ResolvedContext {
            context: extract::fallback_context(keyword, location),
            source: ContextSource::Fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{LocalResult, OrganicResult, SearchResultSet};
    use async_trait::async_trait;
    use chrono::{TimeDelta, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
    }

    impl CountingProvider {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SearchProvider for CountingProvider {
        async fn search(&self, request: &SearchRequest) -> Result<SearchResultSet> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(request.limit, CONTEXT_RESULT_LIMIT);
            Ok(SearchResultSet {
                organic: vec![OrganicResult {
                    title: "Austin bakery shop".into(),
                    snippet: "Artisan bakery and cafe".into(),
                    link: "https://austinbakes.com/about".into(),
                }],
                local: vec![LocalResult {
                    title: "Sugar Co".into(),
                    address: "12 Main St, East Austin, Austin".into(),
                }],
                related: vec!["vegan bakery".into()],
            })
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl SearchProvider for FailingProvider {
        async fn search(&self, _request: &SearchRequest) -> Result<SearchResultSet> {
            Err(Error::ProviderUnavailable("connection refused".into()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl SearchProvider for SlowProvider {
        async fn search(&self, _request: &SearchRequest) -> Result<SearchResultSet> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(SearchResultSet::default())
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    fn resolver(provider: Option<Arc<dyn SearchProvider>>) -> ContextResolver {
        ContextResolver::new(
            provider,
            Arc::new(ContextCache::new(100, Duration::from_secs(86_400))),
            Duration::from_millis(100),
        )
    }

    #[tokio::test]
    async fn test_resolve_uses_provider_then_cache() {
        let provider = Arc::new(CountingProvider::new());
        let resolver = resolver(Some(provider.clone()));

        let first = resolver.resolve_detailed("bakery", "Austin").await;
        assert_eq!(first.source, ContextSource::Provider);
        assert_eq!(first.context.primary_business_types, vec!["shop", "cafe"]);
        assert_eq!(first.context.keyword_variations, vec!["bakery", "vegan"]);
        assert_eq!(first.context.location_areas, vec!["East Austin"]);

        let second = resolver.resolve_detailed("Bakery", " austin ").await;
        assert_eq!(second.source, ContextSource::Cache);
        assert_eq!(second.context, first.context);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_triggers_refetch() {
        let provider = Arc::new(CountingProvider::new());
        let resolver = resolver(Some(provider.clone()));

        let stale = extract::fallback_context("bakery", "Austin");
        resolver.cache().put_at(
            cache_key("bakery", "Austin"),
            stale,
            Utc::now() - TimeDelta::seconds(86_401),
        );

        let resolved = resolver.resolve_detailed("bakery", "Austin").await;
        assert_eq!(resolved.source, ContextSource::Provider);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_falls_back_uncached() {
        let resolver = resolver(Some(Arc::new(FailingProvider)));

        let resolved = resolver.resolve_detailed("bakery", "Austin").await;
        assert!(resolved.is_fallback());
        assert_eq!(resolved.context, extract::fallback_context("bakery", "Austin"));
        assert!(resolver.cache().is_empty());
    }

    #[tokio::test]
    async fn test_provider_timeout_falls_back() {
        let resolver = resolver(Some(Arc::new(SlowProvider)));
        let resolved = resolver.resolve_detailed("bakery", "Austin").await;
        assert!(resolved.is_fallback());
    }

    #[tokio::test]
    async fn test_no_provider_is_fallback_only() {
        let resolver = resolver(None);
        assert!(!resolver.has_provider());

        let context = resolver.resolve("bakery", "Austin").await;
        assert_eq!(context.keyword_variations, vec!["bakery"]);
        assert!(resolver.cache().is_empty());
    }
}
