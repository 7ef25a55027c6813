//! The two upstream operations the engine runs through the executor.

use async_trait::async_trait;
use log::debug;

use crate::errors::MarketDataError;
use crate::models::{DailyRequest, DailyTable, Market, OperationKind, RealtimeQuote};
use crate::normalizer::normalize_recent;
use crate::provider::MarketDataProvider;

use super::ProviderOperation;

/// Fetch daily history and normalize it into a [`DailyTable`].
#[derive(Clone, Debug)]
pub struct DailyOperation {
    request: DailyRequest,
    market: Market,
}

impl DailyOperation {
    /// `request` must already be normalized.
    pub fn new(request: DailyRequest, market: Market) -> Self {
        Self { request, market }
    }
}

#[async_trait]
impl ProviderOperation for DailyOperation {
    type Output = DailyTable;

    fn kind(&self) -> OperationKind {
        OperationKind::Daily
    }

    fn symbol(&self) -> &str {
        &self.request.symbol
    }

    async fn invoke(&self, provider: &dyn MarketDataProvider) -> Result<DailyTable, MarketDataError> {
        let id = provider.id();
        if !provider.supports_market(self.market) {
            return Err(MarketDataError::UnsupportedMarket {
                provider: id.to_string(),
                market: self.market,
            });
        }

        let request = &self.request;
        let raw = provider
            .fetch_daily(&request.symbol, request.start, request.end, request.days)
            .await?;
        if raw.is_empty() {
            return Err(MarketDataError::EmptyResult {
                provider: id.to_string(),
            });
        }

        // Without a start date only the last `days` rows are wanted
        let keep = request.start.is_none().then_some(request.days as usize);
        let bars = normalize_recent(&raw, &provider.schema(), keep);
        if bars.is_empty() {
            return Err(MarketDataError::Parse {
                provider: id.to_string(),
                message: format!("none of {} rows matched the canonical schema", raw.len()),
            });
        }

        let table = DailyTable::new(request.symbol.clone(), self.market, bars);
        debug!("'{}' returned {} rows for {}", id, table.len(), request.symbol);
        Ok(table)
    }
}

/// Fetch a realtime quote. A provider answering `None` counts as empty.
#[derive(Clone, Debug)]
pub struct RealtimeOperation {
    symbol: String,
    market: Market,
}

impl RealtimeOperation {
    pub fn new(symbol: impl Into<String>, market: Market) -> Self {
        Self {
            symbol: symbol.into(),
            market,
        }
    }
}

#[async_trait]
impl ProviderOperation for RealtimeOperation {
    type Output = RealtimeQuote;

    fn kind(&self) -> OperationKind {
        OperationKind::Realtime
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }

    async fn invoke(
        &self,
        provider: &dyn MarketDataProvider,
    ) -> Result<RealtimeQuote, MarketDataError> {
        if !provider.supports_market(self.market) {
            return Err(MarketDataError::UnsupportedMarket {
                provider: provider.id().to_string(),
                market: self.market,
            });
        }

        provider
            .fetch_realtime_quote(&self.symbol)
            .await?
            .ok_or_else(|| MarketDataError::EmptyResult {
                provider: provider.id().to_string(),
            })
    }
}
