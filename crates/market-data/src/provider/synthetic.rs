//! Deterministic offline provider.
//!
//! Generates business-day bars from a ChaCha8 random walk seeded by the md5
//! digest of the symbol, so the same symbol and date range always produce the same
//! table. Registered last (priority 999) as the always-available fallback.

use async_trait::async_trait;
use chrono::{Datelike, Days, NaiveDate, Utc, Weekday};
use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use crate::errors::MarketDataError;
use crate::models::{Market, RawTable, RealtimeQuote};
use crate::normalizer::ProviderSchema;
use crate::resolver::classify;

use super::MarketDataProvider;

pub const SYNTHETIC_PROVIDER_ID: &str = "SYNTHETIC";

/// Longest calendar lookback generated when no start date is given.
const MAX_LOOKBACK_DAYS: u64 = 7300;

/// Portable generator seeded from the md5 digest of the symbol.
fn rng_for_symbol(symbol: &str) -> ChaCha8Rng {
    let digest = md5::compute(symbol.as_bytes());
    let mut seed = [0u8; 8];
    seed.copy_from_slice(&digest.0[..8]);
    ChaCha8Rng::seed_from_u64(u64::from_le_bytes(seed))
}

/// Daily return in `[-2%, +2%]` with four decimal places.
fn daily_return(rng: &mut ChaCha8Rng) -> Decimal {
    Decimal::new(rng.gen_range(-200..=200), 4)
}

/// Offline provider producing deterministic synthetic data for any market.
#[derive(Clone, Debug, Default)]
pub struct SyntheticProvider {
    as_of: Option<NaiveDate>,
}

impl SyntheticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin "today" so generated tables do not depend on the wall clock.
    pub fn as_of(date: NaiveDate) -> Self {
        Self { as_of: Some(date) }
    }

    fn today(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }

    fn business_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
            .collect()
    }

    /// Generate canonical-schema rows for the given dates.
    fn generate(symbol: &str, dates: &[NaiveDate]) -> Vec<Value> {
        let mut rng = rng_for_symbol(symbol);
        let mut close = Decimal::new(rng.gen_range(1_000..50_000), 2);
        let mut rows = Vec::with_capacity(dates.len());

        for date in dates {
            let open = close;
            close = (open * (Decimal::ONE + daily_return(&mut rng))).round_dp(2);
            let spread = Decimal::new(rng.gen_range(0..=100), 4);
            let high = (open.max(close) * (Decimal::ONE + spread)).round_dp(2);
            let low = (open.min(close) * (Decimal::ONE - spread)).round_dp(2);
            let volume: u64 = rng.gen_range(100_000..1_000_000);

            rows.push(json!({
                "date": date.format("%Y-%m-%d").to_string(),
                "open": open.to_string(),
                "high": high.to_string(),
                "low": low.to_string(),
                "close": close.to_string(),
                "volume": volume,
            }));
        }
        rows
    }
}

#[async_trait]
impl MarketDataProvider for SyntheticProvider {
    fn id(&self) -> &'static str {
        SYNTHETIC_PROVIDER_ID
    }

    fn priority(&self) -> i32 {
        999
    }

    fn supports_market(&self, _market: Market) -> bool {
        true
    }

    fn schema(&self) -> ProviderSchema {
        ProviderSchema::canonical()
    }

    async fn fetch_daily(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        days: u32,
    ) -> Result<RawTable, MarketDataError> {
        info!("[{}] Generating synthetic history for {}", self.id(), symbol);

        let end = end.unwrap_or_else(|| self.today());
        let mut dates = match start {
            Some(start) => Self::business_days(start, end),
            None => {
                let lookback = (u64::from(days) * 2).min(MAX_LOOKBACK_DAYS);
                let start = end.checked_sub_days(Days::new(lookback)).unwrap_or(end);
                Self::business_days(start, end)
            }
        };
        if start.is_none() && dates.len() > days as usize {
            dates.drain(..dates.len() - days as usize);
        }

        Ok(RawTable::from_values(Self::generate(symbol, &dates)))
    }

    async fn fetch_realtime_quote(
        &self,
        symbol: &str,
    ) -> Result<Option<RealtimeQuote>, MarketDataError> {
        let raw = self.fetch_daily(symbol, None, None, 2).await?;
        let bars = crate::normalizer::normalize(&raw, &self.schema());
        let Some(last) = bars.last() else {
            return Ok(None);
        };

        let currency = classify(symbol).currency();
        let mut quote = RealtimeQuote::new(symbol, last.close, currency, Utc::now())
            .with_session(last.high, last.low, last.volume);
        if bars.len() > 1 {
            quote = quote.with_previous_close(bars[bars.len() - 2].close);
        }
        Ok(Some(quote))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::normalize;

    fn as_of() -> NaiveDate {
        // Friday
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[tokio::test]
    async fn test_daily_is_deterministic_per_symbol() {
        let provider = SyntheticProvider::as_of(as_of());
        let a = provider.fetch_daily("AAPL", None, None, 10).await.unwrap();
        let b = provider.fetch_daily("AAPL", None, None, 10).await.unwrap();
        let c = provider.fetch_daily("MSFT", None, None, 10).await.unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_symbol_seed_is_stable_and_draws_stay_in_range() {
        let mut a = rng_for_symbol("600519");
        let mut b = rng_for_symbol("600519");
        for _ in 0..1_000 {
            let ret = daily_return(&mut a);
            assert_eq!(ret, daily_return(&mut b));
            assert!(ret >= Decimal::new(-200, 4) && ret <= Decimal::new(200, 4));
        }

        let rows = SyntheticProvider::generate("600519", &[as_of()]);
        let volume = rows[0]["volume"].as_u64().unwrap();
        assert!((100_000..1_000_000).contains(&volume));
    }

    #[tokio::test]
    async fn test_daily_keeps_last_business_days() {
        let provider = SyntheticProvider::as_of(as_of());
        let raw = provider.fetch_daily("600519", None, None, 5).await.unwrap();
        let bars = normalize(&raw, &provider.schema());

        assert_eq!(bars.len(), 5);
        assert_eq!(bars.last().unwrap().date, as_of());
        assert_eq!(
            bars.first().unwrap().date,
            NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()
        );
        for bar in &bars {
            assert!(bar.high >= bar.low);
            assert!(bar.close > Decimal::ZERO);
        }
    }

    #[tokio::test]
    async fn test_explicit_range_is_not_truncated() {
        let provider = SyntheticProvider::new();
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let raw = provider
            .fetch_daily("VOD.L", Some(start), Some(end), 5)
            .await
            .unwrap();
        // 23 weekdays in January 2024
        assert_eq!(raw.len(), 23);
    }

    #[tokio::test]
    async fn test_realtime_quote_from_last_bar() {
        let provider = SyntheticProvider::as_of(as_of());
        let quote = provider.fetch_realtime_quote("0005.HK").await.unwrap().unwrap();
        assert_eq!(quote.currency, "HKD");
        assert!(quote.change_pct.is_some());

        let raw = provider.fetch_daily("0005.HK", None, None, 2).await.unwrap();
        let bars = normalize(&raw, &provider.schema());
        assert_eq!(quote.price, bars[1].close);
    }
}
