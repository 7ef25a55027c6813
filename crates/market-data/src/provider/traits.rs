//! Market data provider trait definitions.
//!
//! This module defines the `MarketDataProvider` trait that every upstream
//! data source implements.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::MarketDataError;
use crate::models::{Market, RawTable, RealtimeQuote};
use crate::normalizer::ProviderSchema;

/// Trait for market data providers.
///
/// Implement this trait to add a new upstream source. The registry orders
/// providers by [`priority`](Self::priority); the routing policy puts a
/// market's preferred providers first.
///
/// Errors follow the crate taxonomy: network problems are transient
/// (`Timeout`, `Connection`, `RateLimited`), anything the provider will
/// never be able to serve is permanent (`UnsupportedMarket`,
/// `InvalidSymbol`, `EmptyResult`, `Parse`).
///
/// # Example
///
/// ```no_run
/// use async_trait::async_trait;
/// use chrono::NaiveDate;
/// use marketroute_market_data::{
///     Market, MarketDataError, MarketDataProvider, ProviderSchema, RawTable,
/// };
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl MarketDataProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     fn supports_market(&self, market: Market) -> bool {
///         market.is_us()
///     }
///
///     fn schema(&self) -> ProviderSchema {
///         ProviderSchema::yahoo()
///     }
///
///     async fn fetch_daily(
///         &self,
///         _symbol: &str,
///         _start: Option<NaiveDate>,
///         _end: Option<NaiveDate>,
///         _days: u32,
///     ) -> Result<RawTable, MarketDataError> {
///         Ok(RawTable::new())
///     }
/// }
/// ```
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "YFINANCE", "AKSHARE", etc.
    /// Used for routing tables, logging and failure records.
    fn id(&self) -> &'static str;

    /// Provider priority for ordering.
    ///
    /// Lower values = higher priority. Default is 10.
    fn priority(&self) -> i32 {
        10
    }

    /// Whether the provider can serve symbols of `market`.
    fn supports_market(&self, market: Market) -> bool;

    /// Column mapping applied to this provider's raw daily tables.
    fn schema(&self) -> ProviderSchema {
        ProviderSchema::canonical()
    }

    /// Fetch daily history.
    ///
    /// # Arguments
    ///
    /// * `symbol` - Normalized symbol as the caller gave it
    /// * `start` - First date (inclusive), if any
    /// * `end` - Last date (inclusive), if any
    /// * `days` - Number of trailing rows wanted when `start` is absent
    async fn fetch_daily(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        days: u32,
    ) -> Result<RawTable, MarketDataError>;

    /// Fetch a realtime quote.
    ///
    /// Providers without realtime support keep the default, which returns
    /// `Ok(None)`. The executor treats `None` as a permanent failure.
    async fn fetch_realtime_quote(
        &self,
        symbol: &str,
    ) -> Result<Option<RealtimeQuote>, MarketDataError> {
        let _ = symbol;
        Ok(None)
    }
}
