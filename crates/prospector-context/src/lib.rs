//! Prospector Context: market-context resolution backed by a search-results
//! provider and an in-memory TTL cache.
//!
//! `ContextResolver` is total: without a provider, or when the provider
//! fails, it returns a generic fallback context.

pub mod cache;
pub mod extract;
pub mod filters;
pub mod provider;
pub mod resolver;

pub use cache::{cache_key, ContextCache};
pub use provider::{SearchProvider, SearchRequest, SearchResultSet, SerpApiProvider};
pub use resolver::{ContextResolver, ContextSource, ResolvedContext};

use std::sync::Arc;

/// Create the search provider for the given credentials, if any.
pub fn create_search_provider(api_key: Option<&str>) -> Option<Arc<dyn SearchProvider>> {
    match api_key.map(str::trim).filter(|k| !k.is_empty()) {
        Some(key) => {
            tracing::info!("Using SerpAPI search provider");
            Some(Arc::new(SerpApiProvider::new(key)))
        }
        None => {
            tracing::warn!("SERP_API_KEY not set. Context resolution will use generic fallbacks.");
            None
        }
    }
}
