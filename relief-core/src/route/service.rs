//! Live routing seam.

use async_trait::async_trait;

use super::TravelMode;
use crate::{Coordinate, ProviderError};

/// One manoeuvre of a live route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteStep {
    /// Instruction or street name reported by the service.
    pub instruction: String,
    /// Step length in metres.
    pub distance_meters: f64,
    /// Step duration in seconds.
    pub duration_seconds: f64,
}

/// Totals and breakdown returned by a [`RoutingService`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LiveRoute {
    /// Total length in metres.
    pub distance_meters: f64,
    /// Total duration in seconds.
    pub duration_seconds: f64,
    /// Step-level breakdown, possibly empty.
    pub steps: Vec<RouteStep>,
}

impl LiveRoute {
    /// Whether both totals are finite and non-negative.
    #[must_use]
    pub fn is_plausible(&self) -> bool {
        let valid = |value: f64| value.is_finite() && value >= 0.0;
        valid(self.distance_meters) && valid(self.duration_seconds)
    }
}

/// A routing backend able to compute a single origin/destination route.
///
/// Implementations report every failure (transport, status, payload) as a
/// [`ProviderError`]; the [`RouteEstimator`](super::RouteEstimator) turns
/// those into an analytic estimate.
#[async_trait]
pub trait RoutingService: Send + Sync {
    /// Compute a route for `mode` between the two coordinates.
    async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TravelMode,
    ) -> Result<LiveRoute, ProviderError>;
}
