//! Configuration loaded from the environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Hard upper bound on queries per request.
pub const MAX_TOP_K: usize = 100;
/// Queries generated when the request does not say.
pub const DEFAULT_TOP_K: usize = 15;
/// Personal email providers the generator and the scorer know about.
pub const EMAIL_PROVIDERS: &[&str] = &[
    "gmail.com",
    "yahoo.com",
    "outlook.com",
    "hotmail.com",
    "aol.com",
    "live.com",
];

/// Bounds enforced on incoming requests before the pipeline runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestLimits {
    pub max_top_k: usize,
    /// Maximum number of include (or exclude) terms.
    pub max_filter_terms: usize,
    /// Maximum length of a single include/exclude term.
    pub max_filter_term_len: usize,
    /// Maximum length of `industry` and `region`.
    pub max_field_len: usize,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_top_k: MAX_TOP_K,
            max_filter_terms: 20,
            max_filter_term_len: 100,
            max_field_len: 200,
        }
    }
}

/// Context cache sizing.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub ttl: Duration,
    pub max_entries: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(86_400),
            max_entries: 1000,
        }
    }
}

/// Weights, saturation points and label thresholds of the coverage heuristic.
///
/// Each sub-score is `min(count / saturation, 1) * weight`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageWeights {
    pub industry_weight: f64,
    pub industry_saturation: f64,
    pub geography_weight: f64,
    pub geography_saturation: f64,
    pub structure_weight: f64,
    pub structure_saturation: f64,
    pub provider_weight: f64,
    pub excellent_threshold: f64,
    pub good_threshold: f64,
    pub fair_threshold: f64,
}

impl Default for CoverageWeights {
    fn default() -> Self {
        Self {
            industry_weight: 30.0,
            industry_saturation: 10.0,
            geography_weight: 25.0,
            geography_saturation: 5.0,
            structure_weight: 25.0,
            structure_saturation: 5.0,
            provider_weight: 20.0,
            excellent_threshold: 80.0,
            good_threshold: 60.0,
            fair_threshold: 40.0,
        }
    }
}

/// Top-level Prospector configuration.
#[derive(Debug, Clone)]
pub struct ProspectorConfig {
    /// HTTP server port.
    pub port: u16,
    /// Upper bound on every external-service call.
    pub provider_timeout: Duration,
    pub cache: CacheSettings,
    pub limits: RequestLimits,
    pub coverage: CoverageWeights,
    /// SerpAPI key; `None` puts the context resolver in fallback-only mode.
    pub serp_api_key: Option<String>,
    /// Optional file overriding the built-in generation prompt.
    pub prompt_template_path: Option<PathBuf>,
}

impl Default for ProspectorConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            provider_timeout: Duration::from_secs(20),
            cache: CacheSettings::default(),
            limits: RequestLimits::default(),
            coverage: CoverageWeights::default(),
            serp_api_key: None,
            prompt_template_path: None,
        }
    }
}

impl ProspectorConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = parse_var(&lookup, "PORT").unwrap_or(defaults.port);
        let provider_timeout = parse_var::<u64>(&lookup, "PROSPECTOR_PROVIDER_TIMEOUT_SECS")
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.provider_timeout);

        let cache = CacheSettings {
            ttl: parse_var::<u64>(&lookup, "PROSPECTOR_CACHE_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache.ttl),
            max_entries: parse_var::<usize>(&lookup, "PROSPECTOR_CACHE_MAX_ENTRIES")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.cache.max_entries),
        };

        let limits = RequestLimits {
            max_top_k: parse_var::<usize>(&lookup, "PROSPECTOR_MAX_TOP_K")
                .map(|k| k.clamp(1, MAX_TOP_K))
                .unwrap_or(MAX_TOP_K),
            ..defaults.limits
        };

        let serp_api_key = lookup("SERP_API_KEY").filter(|k| !k.trim().is_empty());
        let prompt_template_path = lookup("PROSPECTOR_PROMPT_TEMPLATE")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Self {
            port,
            provider_timeout,
            cache,
            limits,
            coverage: defaults.coverage,
            serp_api_key,
            prompt_template_path,
        }
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring unparsable {}={:?}", key, raw);
            None
        }
    }
}
