//! Per-candidate route estimation.
//!
//! The [`RouteEstimator`] prefers a live [`RoutingService`] and degrades to
//! a constant-speed analytic estimate, so callers always receive a
//! [`RouteEstimate`]. Live routing improves accuracy but is never required.

mod estimator;
mod service;
mod types;

pub use estimator::{DEFAULT_LIVE_TIMEOUT, EstimatorConfig, RouteEstimator};
pub use service::{LiveRoute, RouteStep, RoutingService};
pub use types::{
    CYCLING_SPEED_MPS, EstimateSource, ParseTravelModeError, RouteEstimate, RouteQuery,
    TravelMode, WALKING_SPEED_MPS,
};
