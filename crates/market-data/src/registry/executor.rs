//! Failover execution over a routing plan.
//!
//! Providers are tried strictly in plan order. Per provider:
//!
//! - `RetryClass::WithBackoff`: retry the same provider up to
//!   `RetryPolicy::max_attempts`, sleeping between attempts
//! - anything else: record the failure as permanent and move on
//!
//! Provider errors never end the request early. Only the caller deadline
//! does: it bounds attempts and backoff sleeps alike, and when it passes
//! the request ends with `MarketDataError::Cancelled`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::time::Instant;

use crate::errors::{AggregateError, ErrorKind, FetchFailure, MarketDataError, RetryClass};
use crate::models::{OperationKind, Sourced};
use crate::provider::MarketDataProvider;

use super::{ProviderRegistry, RoutingPlan};

/// Default per-attempt timeout.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(20);

/// Exponential backoff for transient failures.
///
/// The delay after the n-th failed attempt is
/// `min(base_delay * multiplier^(n-1), max_delay)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per provider, including the first. Values below 1 count as 1.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            multiplier: 2,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Sleep after failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        self.multiplier
            .checked_pow(exponent)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

/// One upstream call the executor can run against any provider.
#[async_trait]
pub trait ProviderOperation: Send + Sync {
    type Output: Send;

    fn kind(&self) -> OperationKind;

    /// Symbol used in failure records and cancellation errors.
    fn symbol(&self) -> &str;

    /// Run the operation against one provider. An `Ok` must be a usable,
    /// non-empty result.
    async fn invoke(&self, provider: &dyn MarketDataProvider)
        -> Result<Self::Output, MarketDataError>;
}

/// Walks a [`RoutingPlan`] until a provider succeeds.
#[derive(Clone, Debug)]
pub struct FailoverExecutor {
    registry: Arc<ProviderRegistry>,
    retry: RetryPolicy,
    attempt_timeout: Duration,
}

impl FailoverExecutor {
    pub fn new(registry: Arc<ProviderRegistry>, retry: RetryPolicy, attempt_timeout: Duration) -> Self {
        Self {
            registry,
            retry,
            attempt_timeout,
        }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Run `operation` over `plan`.
    ///
    /// Returns the first success together with the provider that produced
    /// it, [`MarketDataError::AllProvidersFailed`] once every provider is
    /// exhausted, or [`MarketDataError::Cancelled`] when `deadline` passes.
    pub async fn execute<O: ProviderOperation>(
        &self,
        plan: &RoutingPlan,
        operation: &O,
        deadline: Option<Instant>,
    ) -> Result<Sourced<O::Output>, MarketDataError> {
        let symbol = operation.symbol();
        let mut aggregate = AggregateError::new(symbol, operation.kind());
        let max_attempts = self.retry.attempts();

        for provider_id in plan.iter() {
            let Some(provider) = self.registry.get(provider_id) else {
                warn!("Provider '{}' in plan is not registered, skipping", provider_id);
                continue;
            };

            let mut attempt = 0;
            loop {
                attempt += 1;
                debug!(
                    "{} {}: trying '{}' (attempt {}/{})",
                    operation.kind(),
                    symbol,
                    provider_id,
                    attempt,
                    max_attempts
                );

                let result =
                    with_deadline(deadline, symbol, self.attempt(provider.as_ref(), operation)).await?;

                let err = match result {
                    Ok(value) => {
                        info!(
                            "{} {}: served by '{}' after {} attempt(s)",
                            operation.kind(),
                            symbol,
                            provider_id,
                            attempt
                        );
                        return Ok(Sourced::new(value, provider_id.clone()));
                    }
                    Err(err) => err,
                };

                match err.retry_class() {
                    RetryClass::NextProvider | RetryClass::Never => {
                        debug!("Provider '{}' failed with {}, trying next provider", provider_id, err);
                        aggregate.push(FetchFailure::new(
                            provider_id.clone(),
                            ErrorKind::Permanent,
                            err.to_string(),
                            attempt,
                        ));
                        break;
                    }
                    RetryClass::WithBackoff if attempt >= max_attempts => {
                        warn!(
                            "Provider '{}' still failing after {} attempts: {}",
                            provider_id, attempt, err
                        );
                        aggregate.push(FetchFailure::new(
                            provider_id.clone(),
                            ErrorKind::Transient,
                            err.to_string(),
                            attempt,
                        ));
                        break;
                    }
                    RetryClass::WithBackoff => {
                        let delay = self.retry.delay_for(attempt);
                        debug!(
                            "Provider '{}' failed with {}, retrying in {:?}",
                            provider_id, err, delay
                        );
                        with_deadline(deadline, symbol, tokio::time::sleep(delay)).await?;
                    }
                }
            }
        }

        warn!(
            "{} {}: all providers failed: {}",
            operation.kind(),
            symbol,
            aggregate.summary()
        );
        Err(MarketDataError::AllProvidersFailed(aggregate))
    }

    /// One bounded attempt. Exceeding the attempt timeout is a transient error.
    async fn attempt<O: ProviderOperation>(
        &self,
        provider: &dyn MarketDataProvider,
        operation: &O,
    ) -> Result<O::Output, MarketDataError> {
        match tokio::time::timeout(self.attempt_timeout, operation.invoke(provider)).await {
            Ok(result) => result,
            Err(_) => Err(MarketDataError::Timeout {
                provider: provider.id().to_string(),
            }),
        }
    }
}

/// Await `future`, failing with `Cancelled` if `deadline` passes first.
pub(crate) async fn with_deadline<F: Future>(
    deadline: Option<Instant>,
    symbol: &str,
    future: F,
) -> Result<F::Output, MarketDataError> {
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, future)
            .await
            .map_err(|_| MarketDataError::Cancelled {
                symbol: symbol.to_string(),
            }),
        None => Ok(future.await),
    }
}
