//! In-memory TTL cache with single-flight loading, using moka

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;
use moka::future::Cache;
use moka::Expiry;
use serde::Serialize;

use crate::errors::MarketDataError;
use crate::models::OperationKind;

/// Cache key: operation, normalized symbol and a request variant
/// (date range and row count for daily data, empty for quotes).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct CacheKey {
    pub kind: OperationKind,
    pub symbol: String,
    pub variant: String,
}

impl CacheKey {
    pub fn new(kind: OperationKind, symbol: impl Into<String>) -> Self {
        Self {
            kind,
            symbol: symbol.into(),
            variant: String::new(),
        }
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = variant.into();
        self
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.variant.is_empty() {
            write!(f, "{}:{}", self.kind, self.symbol)
        } else {
            write!(f, "{}:{}:{}", self.kind, self.symbol, self.variant)
        }
    }
}

/// TTL class of a cached value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TtlClass {
    /// Realtime quotes (60s by default)
    Realtime,
    /// Reference and daily data (1 hour by default)
    Reference,
}

/// A stored value. Replaced on refresh, never mutated.
#[derive(Clone, Debug)]
pub struct CacheEntry<V> {
    pub value: V,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            created_at: Instant::now(),
            ttl,
        }
    }

    pub fn is_live(&self) -> bool {
        self.created_at.elapsed() < self.ttl
    }
}

/// Expire every entry after its own TTL.
struct PerEntryTtl;

impl<V> Expiry<CacheKey, CacheEntry<V>> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &CacheKey,
        value: &CacheEntry<V>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// TTL cache where concurrent loads of the same key share one fetch.
///
/// Unbounded: entries only leave through expiry or invalidation. moka locks
/// per key, so different keys load in parallel.
pub struct TtlCache<V> {
    inner: Cache<CacheKey, CacheEntry<V>>,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Cache::builder().expire_after(PerEntryTtl).build(),
        }
    }

    /// Live cached value, if any.
    pub async fn get(&self, key: &CacheKey) -> Option<V> {
        self.inner
            .get(key)
            .await
            .filter(CacheEntry::is_live)
            .map(|entry| entry.value)
    }

    /// Return the live value for `key`, or run `fetch` and cache its result.
    ///
    /// While a fetch for `key` is in flight, other callers wait for it and
    /// receive the same value or the same error. Errors are not cached.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: CacheKey,
        ttl: Duration,
        fetch: F,
    ) -> Result<V, MarketDataError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, MarketDataError>>,
    {
        if let Some(entry) = self.inner.get(&key).await {
            if entry.is_live() {
                debug!("Cache hit for {}", key);
                return Ok(entry.value);
            }
            self.inner.invalidate(&key).await;
        }

        debug!("Cache miss for {}", key);
        let init = async move { fetch().await.map(|value| CacheEntry::new(value, ttl)) };
        self.inner
            .try_get_with(key, init)
            .await
            .map(|entry| entry.value)
            .map_err(|err: Arc<MarketDataError>| (*err).clone())
    }

    pub async fn invalidate(&self, key: &CacheKey) {
        self.inner.invalidate(key).await;
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Number of stored entries after pending maintenance has run.
    pub async fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }
}

impl<V> Default for TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn key(symbol: &str) -> CacheKey {
        CacheKey::new(OperationKind::Realtime, symbol)
    }

    #[tokio::test]
    async fn test_hit_does_not_refetch() {
        let cache: TtlCache<u32> = TtlCache::new();
        let calls = AtomicUsize::new(0);
        let ttl = Duration::from_secs(60);

        for _ in 0..3 {
            let value = cache
                .get_or_fetch(key("AAPL"), ttl, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .await
                .unwrap();
            assert_eq!(value, 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get(&key("AAPL")).await, Some(7));
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_fetch() {
        let cache: Arc<TtlCache<u32>> = Arc::new(TtlCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let load = |cache: Arc<TtlCache<u32>>, calls: Arc<AtomicUsize>| async move {
            cache
                .get_or_fetch(key("600519"), Duration::from_secs(60), || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok(42)
                })
                .await
        };

        let (a, b) = tokio::join!(
            load(cache.clone(), calls.clone()),
            load(cache.clone(), calls.clone())
        );
        assert_eq!(a.unwrap(), 42);
        assert_eq!(b.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failures_are_shared_but_not_cached() {
        let cache: Arc<TtlCache<u32>> = Arc::new(TtlCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let failing = |cache: Arc<TtlCache<u32>>, calls: Arc<AtomicUsize>| async move {
            cache
                .get_or_fetch(key("AAPL"), Duration::from_secs(60), || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Err(MarketDataError::EmptyResult {
                        provider: "YFINANCE".to_string(),
                    })
                })
                .await
        };

        let (a, b) = tokio::join!(
            failing(cache.clone(), calls.clone()),
            failing(cache.clone(), calls.clone())
        );
        assert_eq!(a.unwrap_err(), b.unwrap_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let value = cache
            .get_or_fetch(key("AAPL"), Duration::from_secs(60), || async { Ok(1) })
            .await
            .unwrap();
        assert_eq!(value, 1);
    }

    #[tokio::test]
    async fn test_expired_entries_are_refetched() {
        let cache: TtlCache<u32> = TtlCache::new();
        let ttl = Duration::from_millis(30);

        let first = cache
            .get_or_fetch(key("VOD.L"), ttl, || async { Ok(1) })
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(cache.get(&key("VOD.L")).await, None);

        let second = cache
            .get_or_fetch(key("VOD.L"), ttl, || async { Ok(2) })
            .await
            .unwrap();
        assert_eq!((first, second), (1, 2));
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let cache: TtlCache<&'static str> = TtlCache::new();
        let ttl = Duration::from_secs(60);
        let daily = CacheKey::new(OperationKind::Daily, "AAPL").with_variant("-:-:30");

        cache.get_or_fetch(key("AAPL"), ttl, || async { Ok("quote") }).await.unwrap();
        cache.get_or_fetch(daily.clone(), ttl, || async { Ok("daily") }).await.unwrap();

        assert_eq!(cache.get(&key("AAPL")).await, Some("quote"));
        assert_eq!(cache.get(&daily).await, Some("daily"));
        assert_eq!(cache.entry_count().await, 2);

        cache.invalidate(&daily).await;
        assert_eq!(cache.get(&daily).await, None);
        cache.invalidate_all();
        assert_eq!(cache.get(&key("AAPL")).await, None);
    }
}
