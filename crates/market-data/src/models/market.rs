//! Market identity and static exchange metadata.
//!
//! Every [`Market`] variant has exactly one [`MarketInfo`] row; adding a
//! market means adding a variant and its row, nothing else.

use chrono::{DateTime, Datelike, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Stock market a symbol trades on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Market {
    ChinaA,
    HongKong,
    UsNyse,
    UsNasdaq,
    UsAmex,
    UkLse,
    GerXetra,
    FraEuronext,
    SwxSix,
    Euronext,
    /// Code matched no classification rule.
    Unknown,
}

/// Broad geographic grouping of markets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketRegion {
    Asia,
    Americas,
    Europe,
    Unknown,
}

/// Regular session in exchange-local time, `(hour, minute)` pairs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TradingHours {
    pub open: (u32, u32),
    pub close: (u32, u32),
}

impl TradingHours {
    const fn new(open: (u32, u32), close: (u32, u32)) -> Self {
        Self { open, close }
    }

    /// Whether `time` falls in the session, both ends inclusive.
    pub fn contains(&self, time: NaiveTime) -> bool {
        let (open, close) = match (
            NaiveTime::from_hms_opt(self.open.0, self.open.1, 0),
            NaiveTime::from_hms_opt(self.close.0, self.close.1, 0),
        ) {
            (Some(open), Some(close)) => (open, close),
            _ => return false,
        };
        time >= open && time <= close
    }
}

/// Static attributes of a market.
#[derive(Clone, Debug)]
pub struct MarketInfo {
    pub code: &'static str,
    pub display_name: &'static str,
    pub currency: &'static str,
    pub timezone: Tz,
    pub region: MarketRegion,
    pub trading_hours: Option<TradingHours>,
}

const CHINA_A: MarketInfo = MarketInfo {
    code: "CHINA_A",
    display_name: "China A-Shares",
    currency: "CNY",
    timezone: chrono_tz::Asia::Shanghai,
    region: MarketRegion::Asia,
    trading_hours: Some(TradingHours::new((9, 15), (15, 0))),
};

const HONG_KONG: MarketInfo = MarketInfo {
    code: "HONG_KONG",
    display_name: "Hong Kong",
    currency: "HKD",
    timezone: chrono_tz::Asia::Hong_Kong,
    region: MarketRegion::Asia,
    trading_hours: Some(TradingHours::new((9, 30), (16, 0))),
};

const US_NYSE: MarketInfo = MarketInfo {
    code: "US_NYSE",
    display_name: "NYSE",
    currency: "USD",
    timezone: chrono_tz::America::New_York,
    region: MarketRegion::Americas,
    trading_hours: Some(TradingHours::new((9, 30), (16, 0))),
};

const US_NASDAQ: MarketInfo = MarketInfo {
    code: "US_NASDAQ",
    display_name: "NASDAQ",
    currency: "USD",
    timezone: chrono_tz::America::New_York,
    region: MarketRegion::Americas,
    trading_hours: Some(TradingHours::new((9, 30), (16, 0))),
};

const US_AMEX: MarketInfo = MarketInfo {
    code: "US_AMEX",
    display_name: "NYSE American",
    currency: "USD",
    timezone: chrono_tz::America::New_York,
    region: MarketRegion::Americas,
    trading_hours: Some(TradingHours::new((9, 30), (16, 0))),
};

const UK_LSE: MarketInfo = MarketInfo {
    code: "UK_LSE",
    display_name: "London Stock Exchange",
    currency: "GBP",
    timezone: chrono_tz::Europe::London,
    region: MarketRegion::Europe,
    trading_hours: Some(TradingHours::new((8, 0), (16, 30))),
};

const GER_XETRA: MarketInfo = MarketInfo {
    code: "GER_XETRA",
    display_name: "Deutsche Boerse Xetra",
    currency: "EUR",
    timezone: chrono_tz::Europe::Berlin,
    region: MarketRegion::Europe,
    trading_hours: Some(TradingHours::new((9, 0), (17, 30))),
};

const FRA_EURONEXT: MarketInfo = MarketInfo {
    code: "FRA_EURONEXT",
    display_name: "Euronext Paris",
    currency: "EUR",
    timezone: chrono_tz::Europe::Paris,
    region: MarketRegion::Europe,
    trading_hours: Some(TradingHours::new((9, 0), (17, 30))),
};

const SWX_SIX: MarketInfo = MarketInfo {
    code: "SWX_SIX",
    display_name: "SIX Swiss Exchange",
    currency: "CHF",
    timezone: chrono_tz::Europe::Zurich,
    region: MarketRegion::Europe,
    trading_hours: Some(TradingHours::new((9, 0), (17, 30))),
};

const EURONEXT: MarketInfo = MarketInfo {
    code: "EURONEXT",
    display_name: "Euronext Amsterdam",
    currency: "EUR",
    timezone: chrono_tz::Europe::Amsterdam,
    region: MarketRegion::Europe,
    trading_hours: Some(TradingHours::new((9, 0), (17, 30))),
};

const UNKNOWN: MarketInfo = MarketInfo {
    code: "UNKNOWN",
    display_name: "Unknown",
    currency: "USD",
    timezone: chrono_tz::UTC,
    region: MarketRegion::Unknown,
    trading_hours: None,
};

impl Market {
    pub const ALL: [Market; 11] = [
        Market::ChinaA,
        Market::HongKong,
        Market::UsNyse,
        Market::UsNasdaq,
        Market::UsAmex,
        Market::UkLse,
        Market::GerXetra,
        Market::FraEuronext,
        Market::SwxSix,
        Market::Euronext,
        Market::Unknown,
    ];

    pub fn info(self) -> &'static MarketInfo {
        match self {
            Market::ChinaA => &CHINA_A,
            Market::HongKong => &HONG_KONG,
            Market::UsNyse => &US_NYSE,
            Market::UsNasdaq => &US_NASDAQ,
            Market::UsAmex => &US_AMEX,
            Market::UkLse => &UK_LSE,
            Market::GerXetra => &GER_XETRA,
            Market::FraEuronext => &FRA_EURONEXT,
            Market::SwxSix => &SWX_SIX,
            Market::Euronext => &EURONEXT,
            Market::Unknown => &UNKNOWN,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.info().code
    }

    pub fn display_name(self) -> &'static str {
        self.info().display_name
    }

    pub fn currency(self) -> &'static str {
        self.info().currency
    }

    pub fn timezone(self) -> Tz {
        self.info().timezone
    }

    pub fn region(self) -> MarketRegion {
        self.info().region
    }

    pub fn is_us(self) -> bool {
        matches!(self, Market::UsNyse | Market::UsNasdaq | Market::UsAmex)
    }

    pub fn is_european(self) -> bool {
        self.region() == MarketRegion::Europe
    }

    /// Whether the market is in its regular session at `at`.
    ///
    /// Weekends and markets without a known session are always closed.
    /// Exchange holidays are not modelled.
    pub fn is_trading_hours(self, at: DateTime<Utc>) -> bool {
        let Some(hours) = self.info().trading_hours else {
            return false;
        };
        let local = self.timezone().from_utc_datetime(&at.naive_utc());
        if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }
        hours.contains(local.time())
    }
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Market {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        Market::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| format!("Unknown market: {}", s))
    }
}
