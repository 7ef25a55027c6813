//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all market data operations
//! - [`RetryClass`]: Classification for determining retry behavior
//! - [`ErrorKind`]: The transient/permanent split recorded per provider
//! - [`AggregateError`]: Every provider in a routing plan failed

mod aggregate;
mod retry;

pub use aggregate::{AggregateError, FetchFailure};
pub use retry::{ErrorKind, RetryClass};

use thiserror::Error;

use crate::models::Market;

/// Errors that can occur during market data operations.
///
/// Each variant is classified into a [`RetryClass`] via the
/// [`retry_class`](Self::retry_class) method, which determines how the
/// failover executor handles it. The type is `Clone` so that callers
/// waiting on the same in-flight fetch can all receive the error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The provider could not be reached.
    #[error("Connection failed: {provider} - {message}")]
    Connection {
        /// The provider that could not be reached
        provider: String,
        /// Transport error description
        message: String,
    },

    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The provider does not serve this market.
    #[error("Unsupported market: {provider} - {market}")]
    UnsupportedMarket {
        /// The provider that refused the market
        provider: String,
        /// The market the symbol was classified into
        market: Market,
    },

    /// The provider does not know the symbol or rejects its format.
    #[error("Invalid symbol: {provider} - {symbol}")]
    InvalidSymbol {
        /// The provider that rejected the symbol
        provider: String,
        /// The offending symbol
        symbol: String,
    },

    /// The provider answered but had nothing usable.
    #[error("Empty result: {provider}")]
    EmptyResult {
        /// The provider that returned no data
        provider: String,
    },

    /// The provider's response could not be parsed.
    #[error("Parse error: {provider} - {message}")]
    Parse {
        /// The provider whose payload was malformed
        provider: String,
        /// Parser error description
        message: String,
    },

    /// Every provider in the routing plan failed.
    #[error("{0}")]
    AllProvidersFailed(AggregateError),

    /// The caller's deadline elapsed before a provider answered.
    #[error("Cancelled: {symbol}")]
    Cancelled {
        /// The symbol being fetched when the deadline hit
        symbol: String,
    },

    /// Malformed caller input, rejected before any routing.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A provider with the same id is already registered.
    #[error("Duplicate provider: {0}")]
    DuplicateProvider(String),
}

impl MarketDataError {
    /// Returns the retry classification for this error.
    ///
    /// - [`RetryClass::WithBackoff`]: retry the same provider after a delay
    /// - [`RetryClass::NextProvider`]: skip to the next provider in the plan
    /// - [`RetryClass::Never`]: caller-side error, never worth retrying
    ///
    /// # Examples
    ///
    /// ```
    /// use marketroute_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::Timeout { provider: "YFINANCE".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    ///
    /// let error = MarketDataError::EmptyResult { provider: "YFINANCE".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::NextProvider);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            // Transient errors - retry with backoff
            Self::Timeout { .. } | Self::Connection { .. } | Self::RateLimited { .. } => {
                RetryClass::WithBackoff
            }

            // Provider-local failures - try next provider
            Self::UnsupportedMarket { .. }
            | Self::InvalidSymbol { .. }
            | Self::EmptyResult { .. }
            | Self::Parse { .. } => RetryClass::NextProvider,

            // Terminal for the request
            Self::AllProvidersFailed(_)
            | Self::Cancelled { .. }
            | Self::InvalidRequest(_)
            | Self::DuplicateProvider(_) => RetryClass::Never,
        }
    }

    /// Transient or permanent, as recorded in an [`AggregateError`].
    pub fn error_kind(&self) -> ErrorKind {
        self.retry_class().into()
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// The aggregate failure list, if every provider failed.
    pub fn aggregate(&self) -> Option<&AggregateError> {
        match self {
            Self::AllProvidersFailed(aggregate) => Some(aggregate),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OperationKind;

    #[test]
    fn test_timeout_retries_with_backoff() {
        let error = MarketDataError::Timeout {
            provider: "YFINANCE".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::WithBackoff);
        assert_eq!(error.error_kind(), ErrorKind::Transient);
    }

    #[test]
    fn test_connection_retries_with_backoff() {
        let error = MarketDataError::Connection {
            provider: "AKSHARE".to_string(),
            message: "connection reset by peer".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    }

    #[test]
    fn test_rate_limited_retries_with_backoff() {
        let error = MarketDataError::RateLimited {
            provider: "EFINANCE".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    }

    #[test]
    fn test_unsupported_market_tries_next_provider() {
        let error = MarketDataError::UnsupportedMarket {
            provider: "US_STOCK".to_string(),
            market: Market::ChinaA,
        };
        assert_eq!(error.retry_class(), RetryClass::NextProvider);
        assert_eq!(error.error_kind(), ErrorKind::Permanent);
    }

    #[test]
    fn test_empty_and_parse_try_next_provider() {
        let empty = MarketDataError::EmptyResult {
            provider: "YFINANCE".to_string(),
        };
        let parse = MarketDataError::Parse {
            provider: "YFINANCE".to_string(),
            message: "missing field `chart`".to_string(),
        };
        let symbol = MarketDataError::InvalidSymbol {
            provider: "YFINANCE".to_string(),
            symbol: "??".to_string(),
        };
        assert_eq!(empty.retry_class(), RetryClass::NextProvider);
        assert_eq!(parse.retry_class(), RetryClass::NextProvider);
        assert_eq!(symbol.retry_class(), RetryClass::NextProvider);
    }

    #[test]
    fn test_cancelled_never_retries() {
        let error = MarketDataError::Cancelled {
            symbol: "AAPL".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Never);
        assert!(error.is_cancelled());
    }

    #[test]
    fn test_all_providers_failed_never_retries() {
        let error =
            MarketDataError::AllProvidersFailed(AggregateError::new("AAPL", OperationKind::Daily));
        assert_eq!(error.retry_class(), RetryClass::Never);
        assert!(error.aggregate().is_some());
    }

    #[test]
    fn test_error_display() {
        let error = MarketDataError::Timeout {
            provider: "YFINANCE".to_string(),
        };
        assert_eq!(format!("{}", error), "Timeout: YFINANCE");

        let error = MarketDataError::UnsupportedMarket {
            provider: "EU_STOCK".to_string(),
            market: Market::UsNasdaq,
        };
        assert_eq!(
            format!("{}", error),
            "Unsupported market: EU_STOCK - US_NASDAQ"
        );

        let error = MarketDataError::InvalidRequest("days must be positive".to_string());
        assert_eq!(format!("{}", error), "Invalid request: days must be positive");
    }
}
