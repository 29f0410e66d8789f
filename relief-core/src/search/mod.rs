//! POI search across heterogeneous backends.
//!
//! A [`PoiSearchAggregator`] walks an ordered list of [`SearchStrategy`]
//! implementations (typically remote keyword search, then an open-data
//! query, then the bundled [`SeedSearchStrategy`]) and returns the first
//! non-empty, normalised result set.

mod aggregator;
mod query;
mod seed;
mod strategy;

pub use aggregator::{
    DEFAULT_STRATEGY_TIMEOUT, PoiSearchAggregator, SearchConfig, SearchError, SearchReport,
    StrategyFailure,
};
pub use query::{
    MAX_PROVIDER_RADIUS_METERS, MIN_PROVIDER_RADIUS_METERS, SearchQuery, SearchQueryError,
};
pub use seed::SeedSearchStrategy;
pub use strategy::{SearchStrategy, StrategyKind};
