use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;
use crate::resolver::normalize_symbol;

/// Number of trailing rows returned when no start date is given.
pub const DEFAULT_DAYS: u32 = 30;

/// Daily history request.
///
/// `start`/`end` are inclusive. When `start` is absent only the last
/// `days` rows are kept.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRequest {
    pub symbol: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub days: u32,
    /// Caller deadline for the whole request, overriding the engine default.
    #[serde(skip)]
    pub timeout: Option<Duration>,
}

impl DailyRequest {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            start: None,
            end: None,
            days: DEFAULT_DAYS,
            timeout: None,
        }
    }

    /// Build a request from caller strings. Dates must be `YYYY-MM-DD`.
    pub fn parse(
        symbol: &str,
        start: Option<&str>,
        end: Option<&str>,
        days: Option<u32>,
    ) -> Result<Self, MarketDataError> {
        let mut request = Self::new(symbol);
        request.start = start.map(parse_iso_date).transpose()?;
        request.end = end.map(parse_iso_date).transpose()?;
        if let Some(days) = days {
            request.days = days;
        }
        request.normalized()
    }

    pub fn with_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn with_days(mut self, days: u32) -> Self {
        self.days = days;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Reject malformed input before any routing happens.
    pub fn validate(&self) -> Result<(), MarketDataError> {
        if self.symbol.trim().is_empty() {
            return Err(MarketDataError::InvalidRequest(
                "symbol must not be empty".to_string(),
            ));
        }
        if self.days == 0 {
            return Err(MarketDataError::InvalidRequest(
                "days must be a positive integer".to_string(),
            ));
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(MarketDataError::InvalidRequest(format!(
                    "start {} is after end {}",
                    start, end
                )));
            }
        }
        Ok(())
    }

    /// Validated copy with the symbol trimmed and upper-cased.
    pub fn normalized(&self) -> Result<Self, MarketDataError> {
        self.validate()?;
        Ok(Self {
            symbol: normalize_symbol(&self.symbol)?,
            ..self.clone()
        })
    }

    /// Cache key discriminator: two requests share an entry only if they
    /// would produce the same table.
    pub fn cache_variant(&self) -> String {
        let fmt = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "-".into());
        format!("{}:{}:{}", fmt(self.start), fmt(self.end), self.days)
    }
}

fn parse_iso_date(value: &str) -> Result<NaiveDate, MarketDataError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        MarketDataError::InvalidRequest(format!("invalid date '{}', expected YYYY-MM-DD", value))
    })
}
