//! In-memory caching of price history

use crate::api::{OverviewProvider, PriceHistoryProvider, Quote};
use crate::error::Result;
use crate::overview::CompanyOverview;
use async_trait::async_trait;
use cached::{Cached, TimedCache};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Identifies one history request
///
/// Bounds are kept at day resolution so repeated "until now" requests made
/// during the same day share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl CacheKey {
    pub fn new(symbol: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            start: start.date_naive(),
            end: end.date_naive(),
        }
    }
}

/// Thread-safe TTL cache of quote histories
#[derive(Clone)]
pub struct StockCache {
    entries: Arc<RwLock<TimedCache<CacheKey, Arc<Vec<Quote>>>>>,
}

impl StockCache {
    /// Entries expire `ttl` after insertion
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<Arc<Vec<Quote>>> {
        // TimedCache evicts expired entries on lookup, so reads need the write lock
        self.entries.write().await.cache_get(key).cloned()
    }

    pub async fn insert(&self, key: CacheKey, quotes: Vec<Quote>) -> Arc<Vec<Quote>> {
        let quotes = Arc::new(quotes);
        self.entries
            .write()
            .await
            .cache_set(key, Arc::clone(&quotes));
        quotes
    }

    /// Return the cached history or load, cache and return it
    ///
    /// Empty histories are handed back without being cached, so a symbol
    /// that had no data is asked for again next time.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: CacheKey,
        fetch: F,
    ) -> std::result::Result<Arc<Vec<Quote>>, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<Vec<Quote>, E>>,
    {
        if let Some(quotes) = self.get(&key).await {
            debug!(?key, "History cache hit");
            return Ok(quotes);
        }

        debug!(?key, "History cache miss");
        let quotes = fetch().await?;
        if quotes.is_empty() {
            return Ok(Arc::new(quotes));
        }
        Ok(self.insert(key, quotes).await)
    }

    pub async fn invalidate(&self, key: &CacheKey) {
        self.entries.write().await.cache_remove(key);
    }

    pub async fn clear(&self) {
        self.entries.write().await.cache_clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.cache_size()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// A [`PriceHistoryProvider`] that serves repeated requests from memory
pub struct CachedHistoryProvider<P> {
    inner: P,
    cache: StockCache,
}

impl<P: PriceHistoryProvider> CachedHistoryProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            cache: StockCache::new(ttl),
        }
    }

    pub fn cache(&self) -> &StockCache {
        &self.cache
    }
}

#[async_trait]
impl<P: PriceHistoryProvider> PriceHistoryProvider for CachedHistoryProvider<P> {
    async fn historical_quotes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Quote>> {
        let quotes = self
            .cache
            .get_or_fetch(CacheKey::new(symbol, start, end), || {
                self.inner.historical_quotes(symbol, start, end)
            })
            .await?;
        Ok(quotes.as_ref().clone())
    }
}

/// Overviews are passed through uncached
#[async_trait]
impl<P: OverviewProvider> OverviewProvider for CachedHistoryProvider<P> {
    async fn company_overview(&self, symbol: &str) -> Result<CompanyOverview> {
        self.inner.company_overview(symbol).await
    }
}
