//! LRU + TTL cache for resolved market contexts.
//!
//! Keyed by `lowercase(keyword)_lowercase(location)`. Default: 1000 entries,
//! 24-hour TTL. Expired entries read as misses but stay in the map until they
//! are replaced or pushed out by the LRU bound.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use prospector_core::{CacheSettings, MarketContext};

/// Build the cache key for an (industry, region) pair.
pub fn cache_key(keyword: &str, location: &str) -> String {
    format!(
        "{}_{}",
        keyword.trim().to_lowercase(),
        location.trim().to_lowercase()
    )
}

/// Whether an entry created at `created_at` has outlived `ttl` at `now`.
pub fn is_expired(now: DateTime<Utc>, created_at: DateTime<Utc>, ttl: TimeDelta) -> bool {
    now.signed_duration_since(created_at) >= ttl
}

/// Cached context with its creation time.
struct CacheEntry {
    context: MarketContext,
    created_at: DateTime<Utc>,
}

/// Thread-safe LRU cache for market contexts.
pub struct ContextCache {
    inner: Mutex<CacheInner>,
}

struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    order: Vec<String>,
    max_size: usize,
    ttl: TimeDelta,
}

impl ContextCache {
    /// Create a new cache with the given capacity and TTL.
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        let max_size = max_size.max(1);
        let ttl = TimeDelta::from_std(ttl).unwrap_or_else(|_| TimeDelta::days(36_500));
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::with_capacity(max_size.min(1024)),
                order: Vec::with_capacity(max_size.min(1024)),
                max_size,
                ttl,
            }),
        }
    }

    pub fn from_settings(settings: &CacheSettings) -> Self {
        Self::new(settings.max_entries, settings.ttl)
    }

    /// Get a cached context. Returns None on miss or expired entry.
    pub fn get(&self, key: &str) -> Option<MarketContext> {
        self.get_at(key, Utc::now())
    }

    /// Like [`get`](Self::get), evaluated at an explicit instant.
    pub fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<MarketContext> {
        let mut inner = self.inner.lock();
        let ttl = inner.ttl;

        let context = match inner.entries.get(key) {
            Some(entry) if !is_expired(now, entry.created_at, ttl) => entry.context.clone(),
            _ => return None,
        };

        if let Some(pos) = inner.order.iter().position(|k| k == key) {
            let key = inner.order.remove(pos);
            inner.order.push(key);
        }
        Some(context)
    }

    /// Insert a context, replacing any previous entry for the key.
    pub fn put(&self, key: String, context: MarketContext) {
        self.put_at(key, context, Utc::now());
    }

    pub fn put_at(&self, key: String, context: MarketContext, created_at: DateTime<Utc>) {
        let mut inner = self.inner.lock();
        let entry = CacheEntry {
            context,
            created_at,
        };

        if inner.entries.contains_key(&key) {
            inner.entries.insert(key.clone(), entry);
            inner.order.retain(|k| k != &key);
            inner.order.push(key);
            return;
        }

        // Evict least recently used if at capacity
        while inner.entries.len() >= inner.max_size && !inner.order.is_empty() {
            let oldest = inner.order.remove(0);
            inner.entries.remove(&oldest);
        }

        inner.order.push(key.clone());
        inner.entries.insert(key, entry);
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut inner = self.inner.lock();
        let ttl = inner.ttl;
        let expired: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, e)| is_expired(now, e.created_at, ttl))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &expired {
            inner.entries.remove(key);
        }
        inner.order.retain(|k| !expired.contains(k));
        expired.len()
    }

    /// Number of entries in the cache, expired ones included.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.order.clear();
    }
}

impl Default for ContextCache {
    fn default() -> Self {
        Self::from_settings(&CacheSettings::default())
    }
}
