//! Caching layer
//!
//! Short-lived in-memory cache keyed by operation and symbol. Nothing is
//! persisted.

mod ttl_cache;

pub use ttl_cache::{CacheEntry, CacheKey, TtlCache, TtlClass};
