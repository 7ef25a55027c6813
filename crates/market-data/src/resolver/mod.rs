//! Market resolution for stock codes.
//!
//! - [`classify`] maps a raw code onto a [`Market`](crate::models::Market)
//! - [`canonical_code`] rewrites a code into its market's standard form
//! - [`is_valid_code_format`] checks a code against the market's listing format

mod classifier;
mod symbol;

pub use classifier::{classify, split_suffix, suffix_to_market, MARKET_SUFFIXES};
pub use symbol::{canonical_code, is_valid_code_format, normalize_symbol};
