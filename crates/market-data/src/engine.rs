//! The market data engine: classify, route, cache, fail over.
//!
//! ```text
//! request -> classify -> routing plan -> cache -> (miss) failover executor
//!                                          ^                 |
//!                                          +--- normalized --+
//! ```

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::time::Instant;

use crate::cache::{CacheKey, TtlCache, TtlClass};
use crate::config::EngineConfig;
use crate::errors::MarketDataError;
use crate::models::{
    DailyRequest, DailyTable, Market, OperationKind, ProviderId, RealtimeQuote, Sourced,
};
use crate::registry::{
    with_deadline, DailyOperation, FailoverExecutor, ProviderRegistry, RealtimeOperation,
    RoutingPlan, RoutingPolicy,
};
use crate::resolver::{classify, normalize_symbol};

type CachedDaily = Sourced<Arc<DailyTable>>;
type CachedQuote = Sourced<Arc<RealtimeQuote>>;

/// Entry point for daily history and realtime quotes.
///
/// Built once from a registry and config and shared by all callers. The
/// registry is never mutated after construction; the caches are the only
/// shared mutable state.
pub struct MarketDataEngine {
    routing: RoutingPolicy,
    executor: FailoverExecutor,
    daily_cache: TtlCache<CachedDaily>,
    quote_cache: TtlCache<CachedQuote>,
    config: EngineConfig,
}

impl MarketDataEngine {
    /// Engine with the standard preference tables.
    pub fn new(registry: Arc<ProviderRegistry>, config: EngineConfig) -> Self {
        Self::with_routing(RoutingPolicy::standard(registry), config)
    }

    /// Engine with a custom routing policy.
    pub fn with_routing(routing: RoutingPolicy, config: EngineConfig) -> Self {
        let executor = FailoverExecutor::new(
            routing.registry().clone(),
            config.retry.clone(),
            config.attempt_timeout,
        );
        Self {
            routing,
            executor,
            daily_cache: TtlCache::new(),
            quote_cache: TtlCache::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        self.routing.registry()
    }

    /// Market of a stock code. Never fails.
    pub fn classify(&self, code: &str) -> Market {
        classify(code)
    }

    /// Provider order for `kind` requests on `code`'s market.
    pub fn plan(&self, kind: OperationKind, code: &str) -> RoutingPlan {
        self.routing.plan_for(kind, classify(code))
    }

    /// Daily history for a symbol, with the provider that served it.
    ///
    /// Served from cache within the reference TTL. Fails with
    /// `InvalidRequest` before any routing, `AllProvidersFailed` when no
    /// provider could serve it, or `Cancelled` when the request deadline
    /// passes.
    pub async fn get_daily_data(
        &self,
        request: DailyRequest,
    ) -> Result<(Arc<DailyTable>, ProviderId), MarketDataError> {
        let request = request.normalized()?;
        let market = classify(&request.symbol);
        let plan = self.routing.plan_for(OperationKind::Daily, market);
        let deadline = self.deadline(request.timeout);
        let key = CacheKey::new(OperationKind::Daily, request.symbol.clone())
            .with_variant(request.cache_variant());
        let ttl = self.config.ttl_for(TtlClass::Reference);
        let symbol = request.symbol.clone();

        debug!("Daily {} ({}) via {:?}", symbol, market, plan.names());

        // The load is shared with concurrent callers, so it runs unbounded.
        // Each caller's own deadline only bounds its own wait.
        let operation = DailyOperation::new(request, market);
        let (executor, plan, operation) = (&self.executor, &plan, &operation);
        let fetch = move || async move {
            executor
                .execute(plan, operation, None)
                .await
                .map(|sourced| sourced.map(Arc::new))
        };

        let cached = with_deadline(
            deadline,
            &symbol,
            self.daily_cache.get_or_fetch(key, ttl, fetch),
        )
        .await??;
        Ok(cached.into_parts())
    }

    /// Realtime quote for a symbol, or `None` when no provider can serve it.
    ///
    /// Only invalid input and cancellation are errors.
    pub async fn get_realtime_quote(
        &self,
        symbol: &str,
    ) -> Result<Option<Arc<RealtimeQuote>>, MarketDataError> {
        Ok(self
            .realtime_quote(symbol, self.config.request_timeout)
            .await?
            .map(|(quote, _)| quote))
    }

    /// [`get_realtime_quote`](Self::get_realtime_quote) with a caller deadline.
    pub async fn get_realtime_quote_within(
        &self,
        symbol: &str,
        timeout: Duration,
    ) -> Result<Option<Arc<RealtimeQuote>>, MarketDataError> {
        Ok(self
            .realtime_quote(symbol, Some(timeout))
            .await?
            .map(|(quote, _)| quote))
    }

    /// Realtime quote together with the provider that served it.
    pub async fn get_realtime_quote_with_source(
        &self,
        symbol: &str,
    ) -> Result<Option<(Arc<RealtimeQuote>, ProviderId)>, MarketDataError> {
        self.realtime_quote(symbol, self.config.request_timeout).await
    }

    async fn realtime_quote(
        &self,
        symbol: &str,
        timeout: Option<Duration>,
    ) -> Result<Option<(Arc<RealtimeQuote>, ProviderId)>, MarketDataError> {
        let symbol = normalize_symbol(symbol)?;
        let market = classify(&symbol);
        let plan = self.routing.plan_for(OperationKind::Realtime, market);
        let deadline = self.deadline(timeout);
        let key = CacheKey::new(OperationKind::Realtime, symbol.clone());
        let ttl = self.config.ttl_for(TtlClass::Realtime);

        let operation = RealtimeOperation::new(symbol.clone(), market);
        let (executor, plan, operation) = (&self.executor, &plan, &operation);
        let fetch = move || async move {
            executor
                .execute(plan, operation, None)
                .await
                .map(|sourced| sourced.map(Arc::new))
        };

        let result = with_deadline(
            deadline,
            &symbol,
            self.quote_cache.get_or_fetch(key, ttl, fetch),
        )
        .await
        .and_then(|inner| inner);

        match result {
            Ok(cached) => Ok(Some(cached.into_parts())),
            Err(MarketDataError::AllProvidersFailed(aggregate)) => {
                warn!("No realtime quote for {}: {}", symbol, aggregate.summary());
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Drop every cached entry.
    pub fn invalidate_cache(&self) {
        self.daily_cache.invalidate_all();
        self.quote_cache.invalidate_all();
    }

    fn deadline(&self, timeout: Option<Duration>) -> Option<Instant> {
        timeout
            .or(self.config.request_timeout)
            .map(|timeout| Instant::now() + timeout)
    }
}
