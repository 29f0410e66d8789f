//! Remote restroom search strategies.
//!
//! Both strategies report [`relief_core::StrategyKind::Remote`], so the
//! aggregator hands them the clamped provider radius.

mod keyword;
mod overpass;

pub use keyword::{KeywordSearchConfig, KeywordSearchStrategy};
pub use overpass::{DEFAULT_OVERPASS_URL, OverpassSearchConfig, OverpassSearchStrategy};
