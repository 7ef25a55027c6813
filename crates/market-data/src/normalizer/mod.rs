//! Provider output to canonical schema.
//!
//! Each provider describes its column names with a [`ProviderSchema`];
//! [`normalize`] applies it and derives missing amount and percent-change.

mod normalize;
mod schema;

pub use normalize::{normalize, normalize_recent};
pub use schema::{CanonicalField, ProviderSchema};
