//! Stock code to market classification.
//!
//! Rules are applied in order and the first match wins:
//!
//! 1. Explicit exchange suffix after the last `.` (`0005.HK`, `VOD.L`)
//! 2. All-digit codes by length and leading-digit group
//! 3. Short alphabetic codes without a suffix are US listings
//! 4. Anything else is [`Market::Unknown`]

use log::warn;

use crate::models::Market;

/// Exchange suffix (upper case, without the dot) to market.
pub const MARKET_SUFFIXES: &[(&str, Market)] = &[
    ("HK", Market::HongKong),
    ("NYSE", Market::UsNyse),
    ("NASDAQ", Market::UsNasdaq),
    ("AMEX", Market::UsAmex),
    ("L", Market::UkLse),
    ("LSE", Market::UkLse),
    ("DE", Market::GerXetra),
    ("ETR", Market::GerXetra),
    ("PA", Market::FraEuronext),
    ("EN", Market::FraEuronext),
    ("SW", Market::SwxSix),
    ("SI", Market::SwxSix),
    ("AS", Market::Euronext),
    ("NA", Market::Euronext),
    ("SS", Market::ChinaA),
    ("SH", Market::ChinaA),
    ("SZ", Market::ChinaA),
];

/// Leading-digit groups of six-digit A-share codes.
const SHANGHAI_PREFIXES: &[&str] = &["600", "601", "603", "688"];
const SHENZHEN_PREFIXES: &[&str] = &["000", "002", "300"];

/// Look up a market by its exchange suffix. Case insensitive.
pub fn suffix_to_market(suffix: &str) -> Option<Market> {
    let suffix = suffix.trim_start_matches('.');
    MARKET_SUFFIXES
        .iter()
        .find(|(s, _)| s.eq_ignore_ascii_case(suffix))
        .map(|(_, m)| *m)
}

/// Split `CODE.SUFFIX` into base and suffix when the suffix is a known exchange.
pub fn split_suffix(code: &str) -> (&str, Option<Market>) {
    match code.rsplit_once('.') {
        Some((base, suffix)) if !suffix.is_empty() => match suffix_to_market(suffix) {
            Some(market) => (base, Some(market)),
            None => (code, None),
        },
        _ => (code, None),
    }
}

/// Classify a stock code into its market.
///
/// Never fails: codes that match no rule are [`Market::Unknown`].
///
/// # Examples
///
/// ```
/// use marketroute_market_data::models::Market;
/// use marketroute_market_data::resolver::classify;
///
/// assert_eq!(classify("AAPL"), Market::UsNasdaq);
/// assert_eq!(classify("600519"), Market::ChinaA);
/// assert_eq!(classify("VOD.L"), Market::UkLse);
/// assert_eq!(classify("0005.HK"), Market::HongKong);
/// ```
pub fn classify(code: &str) -> Market {
    let code = code.trim().to_uppercase();

    if let (_, Some(market)) = split_suffix(&code) {
        return market;
    }

    if !code.is_empty() && code.chars().all(|c| c.is_ascii_digit()) {
        if code.len() <= 5 && code.starts_with('0') {
            return Market::HongKong;
        }
        if code.len() == 6
            && SHANGHAI_PREFIXES
                .iter()
                .chain(SHENZHEN_PREFIXES)
                .any(|p| code.starts_with(p))
        {
            return Market::ChinaA;
        }
    }

    if !code.is_empty() && code.len() <= 5 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Market::UsNasdaq;
    }

    warn!("Could not classify stock code '{}', using UNKNOWN", code);
    Market::Unknown
}
