//! Engine configuration.

use std::time::Duration;

use crate::cache::TtlClass;
use crate::registry::{RetryPolicy, DEFAULT_ATTEMPT_TIMEOUT};

/// Default TTL for realtime quotes.
pub const DEFAULT_QUOTE_TTL: Duration = Duration::from_secs(60);
/// Default TTL for reference and daily data.
pub const DEFAULT_REFERENCE_TTL: Duration = Duration::from_secs(3600);

/// Tunables for [`MarketDataEngine`](crate::MarketDataEngine).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub quote_ttl: Duration,
    pub reference_ttl: Duration,
    /// Bound on a single provider call.
    pub attempt_timeout: Duration,
    /// Default deadline for a whole request. `None` waits as long as the
    /// plan takes.
    pub request_timeout: Option<Duration>,
    pub retry: RetryPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            quote_ttl: DEFAULT_QUOTE_TTL,
            reference_ttl: DEFAULT_REFERENCE_TTL,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            request_timeout: None,
            retry: RetryPolicy::default(),
        }
    }
}

impl EngineConfig {
    pub fn ttl_for(&self, class: TtlClass) -> Duration {
        match class {
            TtlClass::Realtime => self.quote_ttl,
            TtlClass::Reference => self.reference_ttl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.ttl_for(TtlClass::Realtime), Duration::from_secs(60));
        assert_eq!(config.ttl_for(TtlClass::Reference), Duration::from_secs(3600));
        assert_eq!(config.attempt_timeout, Duration::from_secs(20));
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.retry.max_attempts, 3);
    }
}
