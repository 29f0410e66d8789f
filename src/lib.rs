//! Facade crate for the Relief restroom finder.
//!
//! This crate re-exports the core domain types and engines, and exposes the
//! network and storage adapters behind the `adapters` feature.

#![forbid(unsafe_code)]

pub use relief_core::{
    Coordinate, CoordinateError, EstimateSource, EstimatorConfig, LiveRoute, PoiSearchAggregator,
    PointOfInterest, ProviderError, RawPoi, ReachabilityFilter, Reachable, RouteEstimate,
    RouteEstimator, RouteQuery, RouteStep, RoutingService, SearchConfig, SearchError,
    SearchQuery, SearchQueryError, SearchReport, SearchStrategy, SeedSearchStrategy,
    StrategyKind, TravelMode, geo_math, journal, journey, navigation, settings,
};

#[cfg(feature = "adapters")]
pub use relief_data::{
    JsonSettingsStore, ProviderBuildError, SettingsError, SqliteLogError, SqliteLogStore,
    routing::{HttpRoutingService, HttpRoutingServiceConfig},
    search::{
        KeywordSearchConfig, KeywordSearchStrategy, OverpassSearchConfig, OverpassSearchStrategy,
    },
};
