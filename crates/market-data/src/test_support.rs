//! Scripted providers shared by unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::json;

use crate::errors::MarketDataError;
use crate::models::{Market, RawTable, RealtimeQuote};
use crate::provider::MarketDataProvider;

/// What the next call does.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Step {
    /// Return three canonical rows closing at `close`.
    Ok(i64),
    Transient,
    Permanent,
    /// Rejects the request as malformed.
    Reject,
    /// Reports a cancellation of its own.
    Cancel,
    Empty,
    /// Never answers within any sane timeout.
    Hang,
}

pub(crate) struct MockProvider {
    id: &'static str,
    priority: i32,
    markets: Option<Vec<Market>>,
    script: Mutex<VecDeque<Step>>,
    fallback: Step,
    delay: Duration,
    pub calls: AtomicUsize,
}

impl MockProvider {
    pub fn new(id: &'static str, priority: i32) -> Self {
        Self {
            id,
            priority,
            markets: None,
            script: Mutex::new(VecDeque::new()),
            fallback: Step::Ok(100),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn arc(id: &'static str, priority: i32) -> Arc<dyn MarketDataProvider> {
        Arc::new(Self::new(id, priority))
    }

    /// Behaviour once the script is exhausted.
    pub fn always(mut self, step: Step) -> Self {
        self.fallback = step;
        self
    }

    /// Queue steps played before the fallback.
    pub fn script(self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.script
            .lock()
            .expect("script lock")
            .extend(steps);
        self
    }

    pub fn markets(mut self, markets: &[Market]) -> Self {
        self.markets = Some(markets.to_vec());
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn next_step(&self) -> Result<Step, MarketDataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let step = self
            .script
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or(self.fallback);
        match step {
            Step::Transient => Err(MarketDataError::Connection {
                provider: self.id.to_string(),
                message: "connection reset".to_string(),
            }),
            Step::Permanent => Err(MarketDataError::InvalidSymbol {
                provider: self.id.to_string(),
                symbol: "?".to_string(),
            }),
            Step::Reject => Err(MarketDataError::InvalidRequest(
                "range too long for this provider".to_string(),
            )),
            Step::Cancel => Err(MarketDataError::Cancelled {
                symbol: "?".to_string(),
            }),
            Step::Hang => {
                tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
                Ok(Step::Empty)
            }
            other => Ok(other),
        }
    }
}

pub(crate) fn sample_rows(close: i64) -> RawTable {
    let days = [(2, close - 2), (3, close - 1), (4, close)];
    RawTable::from_values(days.iter().map(|(day, c)| {
        json!({
            "date": NaiveDate::from_ymd_opt(2024, 1, *day).map(|d| d.to_string()),
            "open": c,
            "high": c + 1,
            "low": c - 1,
            "close": c,
            "volume": 1000,
        })
    }))
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    fn id(&self) -> &'static str {
        self.id
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn supports_market(&self, market: Market) -> bool {
        self.markets
            .as_ref()
            .map_or(true, |markets| markets.contains(&market))
    }

    async fn fetch_daily(
        &self,
        _symbol: &str,
        _start: Option<NaiveDate>,
        _end: Option<NaiveDate>,
        _days: u32,
    ) -> Result<RawTable, MarketDataError> {
        match self.next_step().await? {
            Step::Ok(close) => Ok(sample_rows(close)),
            _ => Ok(RawTable::new()),
        }
    }

    async fn fetch_realtime_quote(
        &self,
        symbol: &str,
    ) -> Result<Option<RealtimeQuote>, MarketDataError> {
        match self.next_step().await? {
            Step::Ok(price) => Ok(Some(RealtimeQuote::new(
                symbol,
                Decimal::from(price),
                "USD",
                Utc.with_ymd_and_hms(2024, 1, 4, 15, 0, 0).unwrap(),
            ))),
            _ => Ok(None),
        }
    }
}
