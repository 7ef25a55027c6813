//! Market data models
//!
//! - `market` - Market identity and static exchange metadata
//! - `types` - Provider ids, operation kinds, sourced values
//! - `raw` - Untyped provider tables before normalization
//! - `daily` - Canonical daily bars
//! - `quote` - Realtime quote snapshots
//! - `request` - Validated daily requests

mod daily;
mod market;
mod quote;
mod raw;
mod request;
mod types;

pub use daily::{DailyBar, DailyTable};
pub use market::{Market, MarketInfo, MarketRegion, TradingHours};
pub use quote::RealtimeQuote;
pub use raw::{RawRow, RawTable};
pub use request::{DailyRequest, DEFAULT_DAYS};
pub use types::{OperationKind, ProviderId, Sourced};
