//! Provider orchestration.
//!
//! This module provides:
//! - [`ProviderRegistry`]: registered providers ordered by priority
//! - [`RoutingPolicy`]: per-market provider order for each request
//! - [`FailoverExecutor`]: retry, skip and aggregate across a routing plan
//! - [`DailyOperation`] / [`RealtimeOperation`]: the calls run by the executor

mod executor;
mod operations;
mod provider_registry;
mod routing;

pub use executor::{FailoverExecutor, ProviderOperation, RetryPolicy, DEFAULT_ATTEMPT_TIMEOUT};
pub(crate) use executor::with_deadline;
pub use operations::{DailyOperation, RealtimeOperation};
pub use provider_registry::ProviderRegistry;
pub use routing::{provider_ids, PreferenceTable, RoutingPlan, RoutingPolicy};
