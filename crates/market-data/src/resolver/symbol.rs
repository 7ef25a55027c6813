//! Symbol normalization and per-market code formats.

use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::MarketDataError;
use crate::models::Market;

use super::classifier::{classify, split_suffix};

lazy_static! {
    static ref CHINA_A_CODE: Regex = Regex::new(r"^\d{6}$").unwrap();
    static ref HONG_KONG_CODE: Regex = Regex::new(r"^\d{4,5}$").unwrap();
    static ref NYSE_CODE: Regex = Regex::new(r"^[A-Z]{1,5}(\.NYSE)?$").unwrap();
    static ref NASDAQ_CODE: Regex = Regex::new(r"^[A-Z]{1,5}(\.NASDAQ)?$").unwrap();
    static ref AMEX_CODE: Regex = Regex::new(r"^[A-Z]{1,5}(\.AMEX)?$").unwrap();
    static ref LSE_CODE: Regex = Regex::new(r"^[A-Z]{1,5}\.L$").unwrap();
    static ref XETRA_CODE: Regex = Regex::new(r"^[A-Z]{1,5}\.DE$").unwrap();
    static ref PARIS_CODE: Regex = Regex::new(r"^[A-Z]{1,5}\.PA$").unwrap();
    static ref SIX_CODE: Regex = Regex::new(r"^[A-Z]{1,5}\.SW$").unwrap();
    static ref AMSTERDAM_CODE: Regex = Regex::new(r"^[A-Z]{1,5}\.AS$").unwrap();
}

/// Trim and upper-case a caller symbol. Empty symbols are rejected.
pub fn normalize_symbol(symbol: &str) -> Result<String, MarketDataError> {
    let normalized = symbol.trim().to_uppercase();
    if normalized.is_empty() {
        return Err(MarketDataError::InvalidRequest(
            "symbol must not be empty".to_string(),
        ));
    }
    Ok(normalized)
}

/// Standard exchange suffix appended by [`canonical_code`].
fn canonical_suffix(market: Market) -> Option<&'static str> {
    match market {
        Market::UsNyse => Some(".NYSE"),
        Market::UsNasdaq => Some(".NASDAQ"),
        Market::UsAmex => Some(".AMEX"),
        Market::UkLse => Some(".L"),
        Market::GerXetra => Some(".DE"),
        Market::FraEuronext => Some(".PA"),
        Market::SwxSix => Some(".SW"),
        Market::Euronext => Some(".AS"),
        Market::ChinaA | Market::HongKong | Market::Unknown => None,
    }
}

fn zero_pad(code: &str, width: usize) -> String {
    if !code.is_empty() && code.chars().all(|c| c.is_ascii_digit()) {
        format!("{:0>width$}", code, width = width)
    } else {
        code.to_string()
    }
}

/// Rewrite a code into the standard form for `market`.
///
/// A known exchange suffix is stripped first. When `market` is `None` it is
/// classified from the code.
///
/// | Market | Form |
/// |--------|------|
/// | US | `AAPL.NASDAQ`, `IBM.NYSE`, `SPY.AMEX` |
/// | Hong Kong | five digits, `00700` |
/// | Europe | `VOD.L`, `SAP.DE`, `MC.PA`, `NESN.SW`, `ASML.AS` |
/// | China A | six digits, `000001` |
/// | Unknown | unchanged |
pub fn canonical_code(code: &str, market: Option<Market>) -> String {
    let upper = code.trim().to_uppercase();
    let market = market.unwrap_or_else(|| classify(&upper));
    let (base, _) = split_suffix(&upper);

    match market {
        Market::HongKong => zero_pad(base, 5),
        Market::ChinaA => zero_pad(base, 6),
        Market::Unknown => upper.clone(),
        other => match canonical_suffix(other) {
            Some(suffix) => format!("{}{}", base, suffix),
            None => base.to_string(),
        },
    }
}

/// Whether `code` has the listing format used on `market`.
///
/// Always false for [`Market::Unknown`].
pub fn is_valid_code_format(code: &str, market: Market) -> bool {
    let code = code.trim().to_uppercase();
    let pattern: &Regex = match market {
        Market::ChinaA => &CHINA_A_CODE,
        Market::HongKong => &HONG_KONG_CODE,
        Market::UsNyse => &NYSE_CODE,
        Market::UsNasdaq => &NASDAQ_CODE,
        Market::UsAmex => &AMEX_CODE,
        Market::UkLse => &LSE_CODE,
        Market::GerXetra => &XETRA_CODE,
        Market::FraEuronext => &PARIS_CODE,
        Market::SwxSix => &SIX_CODE,
        Market::Euronext => &AMSTERDAM_CODE,
        Market::Unknown => return false,
    };
    pattern.is_match(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(" vod.l ").unwrap(), "VOD.L");
        assert!(matches!(
            normalize_symbol("   "),
            Err(MarketDataError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_canonical_code_us() {
        assert_eq!(canonical_code("aapl", None), "AAPL.NASDAQ");
        assert_eq!(canonical_code("IBM", Some(Market::UsNyse)), "IBM.NYSE");
        assert_eq!(canonical_code("SPY.NASDAQ", Some(Market::UsAmex)), "SPY.AMEX");
    }

    #[test]
    fn test_canonical_code_pads_digits() {
        assert_eq!(canonical_code("700", Some(Market::HongKong)), "00700");
        assert_eq!(canonical_code("0005.HK", None), "00005");
        assert_eq!(canonical_code("1", Some(Market::ChinaA)), "000001");
        assert_eq!(canonical_code("600519.SS", None), "600519");
    }

    #[test]
    fn test_canonical_code_europe() {
        assert_eq!(canonical_code("VOD.LSE", None), "VOD.L");
        assert_eq!(canonical_code("SAP.ETR", None), "SAP.DE");
        assert_eq!(canonical_code("ASML", Some(Market::Euronext)), "ASML.AS");
    }

    #[test]
    fn test_canonical_code_unknown_is_unchanged() {
        assert_eq!(canonical_code("brk.b", None), "BRK.B");
    }

    #[test]
    fn test_code_format_validation() {
        assert!(is_valid_code_format("600519", Market::ChinaA));
        assert!(!is_valid_code_format("60051", Market::ChinaA));
        assert!(is_valid_code_format("0700", Market::HongKong));
        assert!(is_valid_code_format("00700", Market::HongKong));
        assert!(is_valid_code_format("aapl", Market::UsNasdaq));
        assert!(is_valid_code_format("AAPL.NASDAQ", Market::UsNasdaq));
        assert!(!is_valid_code_format("AAPL.NYSE", Market::UsNasdaq));
        assert!(is_valid_code_format("VOD.L", Market::UkLse));
        assert!(!is_valid_code_format("VOD", Market::UkLse));
        assert!(!is_valid_code_format("ANYTHING", Market::Unknown));
    }
}
