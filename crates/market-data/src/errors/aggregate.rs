//! Per-provider failure records collected by the failover executor.

use crate::models::{OperationKind, ProviderId};

use super::ErrorKind;

/// One exhausted provider: who failed, how, and after how many attempts.
#[derive(Clone, Debug, PartialEq)]
pub struct FetchFailure {
    pub provider: ProviderId,
    pub kind: ErrorKind,
    pub message: String,
    pub attempts: u32,
}

impl FetchFailure {
    pub fn new(
        provider: ProviderId,
        kind: ErrorKind,
        message: impl Into<String>,
        attempts: u32,
    ) -> Self {
        Self {
            provider,
            kind,
            message: message.into(),
            attempts,
        }
    }
}

/// Every provider in the routing plan failed.
///
/// Failures are kept in attempt order, one entry per provider.
#[derive(Clone, Debug, PartialEq)]
pub struct AggregateError {
    pub symbol: String,
    pub operation: OperationKind,
    pub failures: Vec<FetchFailure>,
}

impl AggregateError {
    pub fn new(symbol: impl Into<String>, operation: OperationKind) -> Self {
        Self {
            symbol: symbol.into(),
            operation,
            failures: Vec::new(),
        }
    }

    pub fn push(&mut self, failure: FetchFailure) {
        self.failures.push(failure);
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Provider ids in the order they were tried.
    pub fn providers(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.provider.as_ref()).collect()
    }

    /// Summary for logging/debugging.
    pub fn summary(&self) -> String {
        if self.failures.is_empty() {
            return "no providers registered".to_string();
        }
        self.failures
            .iter()
            .map(|f| {
                format!(
                    "{}: {} x{} ({})",
                    f.provider, f.kind, f.attempts, f.message
                )
            })
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

impl std::fmt::Display for AggregateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} failed on every provider: {}",
            self.operation,
            self.symbol,
            self.summary()
        )
    }
}

impl std::error::Error for AggregateError {}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;

    #[test]
    fn test_summary_keeps_attempt_order() {
        let mut err = AggregateError::new("AAPL", OperationKind::Daily);
        err.push(FetchFailure::new(
            Cow::Borrowed("US_STOCK"),
            ErrorKind::Transient,
            "Timeout: US_STOCK",
            3,
        ));
        err.push(FetchFailure::new(
            Cow::Borrowed("YFINANCE"),
            ErrorKind::Permanent,
            "Empty result: YFINANCE",
            1,
        ));

        let summary = err.summary();
        let first = summary.find("US_STOCK: TRANSIENT x3").unwrap();
        let second = summary.find("YFINANCE: PERMANENT x1").unwrap();
        assert!(first < second);
        assert_eq!(err.providers(), vec!["US_STOCK", "YFINANCE"]);
    }

    #[test]
    fn test_empty_summary() {
        let err = AggregateError::new("AAPL", OperationKind::Realtime);
        assert!(err.is_empty());
        assert_eq!(err.summary(), "no providers registered");
    }
}
