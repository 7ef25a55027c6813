use std::time::Duration;

use marketroute_market_data::{EngineConfig, RetryPolicy};

pub struct Config {
    pub log_format: String,
    pub quote_ttl: Duration,
    pub reference_ttl: Duration,
    pub attempt_timeout: Duration,
    pub request_timeout: Option<Duration>,
    pub retry_max_attempts: u32,
    pub retry_base: Duration,
    pub retry_max: Duration,
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = EngineConfig::default();

        let log_format = std::env::var("MR_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
        let quote_ttl = env_u64("MR_QUOTE_TTL_SECS", defaults.quote_ttl.as_secs());
        let reference_ttl = env_u64("MR_REFERENCE_TTL_SECS", defaults.reference_ttl.as_secs());
        let attempt_ms = env_u64(
            "MR_ATTEMPT_TIMEOUT_MS",
            defaults.attempt_timeout.as_millis() as u64,
        );
        // 0 or unset: no overall deadline
        let request_ms = env_u64("MR_REQUEST_TIMEOUT_MS", 0);
        let retry_max_attempts = env_u64(
            "MR_RETRY_MAX_ATTEMPTS",
            u64::from(defaults.retry.max_attempts),
        );
        let retry_base_ms = env_u64(
            "MR_RETRY_BASE_MS",
            defaults.retry.base_delay.as_millis() as u64,
        );
        let retry_max_ms = env_u64(
            "MR_RETRY_MAX_MS",
            defaults.retry.max_delay.as_millis() as u64,
        );

        Self {
            log_format,
            quote_ttl: Duration::from_secs(quote_ttl),
            reference_ttl: Duration::from_secs(reference_ttl),
            attempt_timeout: Duration::from_millis(attempt_ms),
            request_timeout: (request_ms > 0).then(|| Duration::from_millis(request_ms)),
            retry_max_attempts: u32::try_from(retry_max_attempts)
                .unwrap_or(defaults.retry.max_attempts),
            retry_base: Duration::from_millis(retry_base_ms),
            retry_max: Duration::from_millis(retry_max_ms),
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        let defaults = RetryPolicy::default();
        EngineConfig {
            quote_ttl: self.quote_ttl,
            reference_ttl: self.reference_ttl,
            attempt_timeout: self.attempt_timeout,
            request_timeout: self.request_timeout,
            retry: RetryPolicy {
                max_attempts: self.retry_max_attempts,
                base_delay: self.retry_base,
                max_delay: self.retry_max,
                ..defaults
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_carries_values() {
        let config = Config {
            log_format: "json".to_string(),
            quote_ttl: Duration::from_secs(5),
            reference_ttl: Duration::from_secs(50),
            attempt_timeout: Duration::from_millis(1500),
            request_timeout: None,
            retry_max_attempts: 1,
            retry_base: Duration::from_millis(10),
            retry_max: Duration::from_millis(20),
        };
        let engine = config.engine_config();
        assert_eq!(engine.quote_ttl, Duration::from_secs(5));
        assert_eq!(engine.reference_ttl, Duration::from_secs(50));
        assert_eq!(engine.retry.max_attempts, 1);
        assert_eq!(engine.retry.multiplier, 2);
        assert_eq!(engine.request_timeout, None);
    }
}
