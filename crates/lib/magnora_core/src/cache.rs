// @awa-component: RVW-ResponseCache
//
//! In-memory response cache with TTL-based expiration.
//!
//! Expiry is lazy: a stale entry is dropped when its exact key is read, and
//! otherwise stays in the map until it is invalidated, purged or cleared.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::debug;

use crate::models::{Product, Review, Shop};
use crate::query::ReviewQuery;

/// Default TTL for cached responses: 5 minutes.
pub const CACHE_TTL: Duration = Duration::from_secs(300);

/// Cache key of the shop record.
pub const SHOP_KEY: &str = "shop-info";

/// Cache key for a review list query.
pub fn reviews_key(product_id: &str, query: &ReviewQuery) -> String {
    format!("reviews-{product_id}-{}", query.cache_fragment())
}

/// Prefix shared by every review list key of one product.
///
/// Includes the opening brace of the options fragment, so neither product
/// `12` nor product `1-2` matches product `1`.
pub fn reviews_prefix(product_id: &str) -> String {
    format!("reviews-{product_id}-{{")
}

/// Cache key for a product record.
pub fn product_key(product_id: &str) -> String {
    format!("product-{product_id}")
}

/// A cached response payload.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheValue {
    Reviews(Vec<Review>),
    Product(Product),
    Shop(Shop),
}

impl From<Vec<Review>> for CacheValue {
    fn from(reviews: Vec<Review>) -> Self {
        CacheValue::Reviews(reviews)
    }
}

impl From<Product> for CacheValue {
    fn from(product: Product) -> Self {
        CacheValue::Product(product)
    }
}

impl From<Shop> for CacheValue {
    fn from(shop: Shop) -> Self {
        CacheValue::Shop(shop)
    }
}

impl TryFrom<CacheValue> for Vec<Review> {
    type Error = CacheValue;

    fn try_from(value: CacheValue) -> Result<Self, Self::Error> {
        match value {
            CacheValue::Reviews(reviews) => Ok(reviews),
            other => Err(other),
        }
    }
}

impl TryFrom<CacheValue> for Product {
    type Error = CacheValue;

    fn try_from(value: CacheValue) -> Result<Self, Self::Error> {
        match value {
            CacheValue::Product(product) => Ok(product),
            other => Err(other),
        }
    }
}

impl TryFrom<CacheValue> for Shop {
    type Error = CacheValue;

    fn try_from(value: CacheValue) -> Result<Self, Self::Error> {
        match value {
            CacheValue::Shop(shop) => Ok(shop),
            other => Err(other),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: CacheValue,
    stored_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() <= ttl
    }
}

/// Response cache keyed by request shape (see [`reviews_key`],
/// [`product_key`], [`SHOP_KEY`]).
#[derive(Debug)]
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl ResponseCache {
    /// Create a cache with the default TTL.
    pub fn new() -> Self {
        Self::with_ttl(CACHE_TTL)
    }

    /// Create a cache with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a cached value if it exists and has not expired.
    ///
    /// A stale entry for `key` is removed.
    pub fn get(&self, key: &str) -> Option<CacheValue> {
        let ttl = self.ttl;
        if self
            .entries
            .remove_if(key, |_, entry| !entry.is_fresh(ttl))
            .is_some()
        {
            debug!(key, "cache entry expired");
            return None;
        }
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Insert or overwrite a cached value.
    pub fn insert(&self, key: String, value: CacheValue) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Whether an entry is stored for `key`, fresh or not.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Remove a specific entry from the cache.
    pub fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Remove every entry whose key starts with `prefix`. Returns the count.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        before.saturating_sub(self.entries.len())
    }

    /// Remove every expired entry. Returns the count.
    pub fn purge_expired(&self) -> usize {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh(ttl));
        before.saturating_sub(self.entries.len())
    }

    /// Spawn a task that purges expired entries every `period`.
    ///
    /// Opt-in; without it stale entries are only dropped on read.
    pub fn spawn_cleanup_task(self: &Arc<Self>, period: Duration) -> tokio::task::JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let purged = cache.purge_expired();
                if purged > 0 {
                    debug!(purged, "purged expired cache entries");
                }
            }
        })
    }

    /// Remove all entries from the cache.
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}
