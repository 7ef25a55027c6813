use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Realtime quote snapshot
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RealtimeQuote {
    /// Normalized symbol the quote was requested for
    pub symbol: String,

    /// Instrument name, when the provider reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Last traded price (required)
    pub price: Decimal,

    /// Change versus previous close, percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_pct: Option<Decimal>,

    /// Change versus previous close, absolute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_amount: Option<Decimal>,

    /// Session volume
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<Decimal>,

    /// Session high
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_high: Option<Decimal>,

    /// Session low
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_low: Option<Decimal>,

    /// Quote currency
    pub currency: String,

    /// Time the provider stamped on the quote
    pub timestamp: DateTime<Utc>,
}

impl RealtimeQuote {
    /// Create a new quote with minimal required fields
    pub fn new(
        symbol: impl Into<String>,
        price: Decimal,
        currency: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: None,
            price,
            change_pct: None,
            change_amount: None,
            volume: None,
            day_high: None,
            day_low: None,
            currency: currency.into(),
            timestamp,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set change fields from the previous close.
    pub fn with_previous_close(mut self, previous_close: Decimal) -> Self {
        let change = self.price - previous_close;
        self.change_amount = Some(change);
        if !previous_close.is_zero() {
            self.change_pct = Some((change / previous_close * Decimal::ONE_HUNDRED).round_dp(2));
        }
        self
    }

    pub fn with_session(mut self, high: Decimal, low: Decimal, volume: Decimal) -> Self {
        self.day_high = Some(high);
        self.day_low = Some(low);
        self.volume = Some(volume);
        self
    }
}
