//! Core domain types and engines for the Relief restroom finder.
//!
//! The crate is organised around one user action: find the nearest
//! restroom, check it can be reached in time, and hand off to a navigation
//! app. Each stage degrades rather than fails:
//!
//! - [`PoiSearchAggregator`] tries [`SearchStrategy`] implementations in
//!   priority order, ending with the bundled [`SeedSearchStrategy`].
//! - [`RouteEstimator`] prefers a live [`RoutingService`] and falls back to
//!   a straight-line estimate.
//! - [`ReachabilityFilter`] picks the nearest candidate within a time budget.
//! - [`navigation::NavigationDispatcher`] walks a ranked list of deep links.
//!
//! [`journey::Journey`] strings the stages together. Network adapters live
//! in `relief-data`.

#![forbid(unsafe_code)]

mod coordinate;
pub mod geo_math;
pub mod journal;
pub mod journey;
pub mod navigation;
mod poi;
mod provider;
mod reachability;
pub mod route;
pub mod search;
pub mod settings;

#[doc(hidden)]
pub mod test_support;

pub use coordinate::{Coordinate, CoordinateError};
pub use poi::{PointOfInterest, RawPoi};
pub use provider::ProviderError;
pub use reachability::{ReachabilityFilter, Reachable};
pub use route::{
    EstimateSource, EstimatorConfig, LiveRoute, RouteEstimate, RouteEstimator, RouteQuery,
    RouteStep, RoutingService, TravelMode,
};
pub use search::{
    PoiSearchAggregator, SearchConfig, SearchError, SearchQuery, SearchQueryError, SearchReport,
    SearchStrategy, SeedSearchStrategy, StrategyKind,
};
