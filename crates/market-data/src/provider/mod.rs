//! Market data provider abstractions.
//!
//! This module contains:
//! - The `MarketDataProvider` trait that all upstream sources implement
//! - `SyntheticProvider`, a deterministic offline source used as the last resort
//!
//! Concrete network clients live outside this crate. They only need to
//! implement [`MarketDataProvider`] and be registered with the
//! [`ProviderRegistry`](crate::registry::ProviderRegistry).

mod synthetic;
mod traits;

pub use synthetic::{SyntheticProvider, SYNTHETIC_PROVIDER_ID};
pub use traits::MarketDataProvider;
