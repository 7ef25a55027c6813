//! MarketRoute Market Data Crate
//!
//! Routes daily-history and realtime-quote requests for equities across
//! China A-shares, Hong Kong, the US and Europe to interchangeable upstream
//! providers, with failover, retry and short-lived caching.
//!
//! # Overview
//!
//! - Market classification from a stock code alone
//! - Per-market provider preference with priority fallback
//! - Transient errors retried with exponential backoff, permanent errors
//!   skipped to the next provider
//! - Provider tables normalized into one canonical OHLCV schema
//! - TTL cache with single-flight loading per key
//!
//! # Architecture
//!
//! ```text
//!                          +------------------+
//!   code / DailyRequest -> | MarketDataEngine |
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |    Resolver      |  (classify -> Market)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |  RoutingPolicy   |  (preferred, then priority)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |    TtlCache      |  (hit, or one shared fetch)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          | FailoverExecutor |  (retry, skip, aggregate)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |    Provider      |  -> RawTable -> normalize
//!                          +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`Market`] - Exchange a code trades on
//! - [`DailyRequest`] / [`DailyTable`] - Daily history in and out
//! - [`RealtimeQuote`] - Latest price snapshot
//! - [`MarketDataError`] - Error taxonomy with retry classification
//! - [`ProviderId`] - Provider identifier (e.g., "AKSHARE", "YFINANCE")

pub mod cache;
pub mod config;
pub mod engine;
pub mod errors;
pub mod models;
pub mod normalizer;
pub mod provider;
pub mod registry;
pub mod resolver;

#[cfg(test)]
mod test_support;

pub use config::EngineConfig;
pub use engine::MarketDataEngine;

pub use models::{
    DailyBar, DailyRequest, DailyTable, Market, MarketRegion, OperationKind, ProviderId,
    RawRow, RawTable, RealtimeQuote, Sourced,
};

pub use resolver::{canonical_code, classify, is_valid_code_format, normalize_symbol};

pub use normalizer::{normalize, normalize_recent, CanonicalField, ProviderSchema};

pub use provider::{MarketDataProvider, SyntheticProvider, SYNTHETIC_PROVIDER_ID};

pub use registry::{
    provider_ids, FailoverExecutor, PreferenceTable, ProviderRegistry, RetryPolicy, RoutingPlan,
    RoutingPolicy,
};

pub use errors::{AggregateError, ErrorKind, FetchFailure, MarketDataError, RetryClass};
