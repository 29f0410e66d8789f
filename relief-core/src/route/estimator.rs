//! Live-first route estimation with an analytic fallback.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use super::{EstimateSource, LiveRoute, RouteEstimate, RouteQuery, RoutingService};
use crate::provider::with_timeout;
use crate::{ProviderError, geo_math};

/// Default allowance for a live routing call.
pub const DEFAULT_LIVE_TIMEOUT: Duration = Duration::from_secs(6);

/// Configuration for [`RouteEstimator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimatorConfig {
    /// Time allowance for the live routing call.
    pub live_timeout: Duration,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            live_timeout: DEFAULT_LIVE_TIMEOUT,
        }
    }
}

impl EstimatorConfig {
    /// Set the live routing timeout.
    #[must_use]
    pub const fn with_live_timeout(mut self, timeout: Duration) -> Self {
        self.live_timeout = timeout;
        self
    }
}

/// Produces a [`RouteEstimate`] for every query.
///
/// A configured [`RoutingService`] is tried first under a timeout. Any
/// failure, including a missing service, falls back to straight-line
/// distance divided by the mode's constant speed. The estimate's `source`
/// records which path answered.
///
/// # Examples
/// ```
/// use relief_core::{Coordinate, EstimateSource, RouteEstimator, RouteQuery, TravelMode};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), relief_core::CoordinateError> {
/// let estimator = RouteEstimator::offline();
/// let query = RouteQuery::new(
///     Coordinate::try_new(31.2304, 121.4737)?,
///     Coordinate::try_new(31.2317, 121.4750)?,
///     TravelMode::Walking,
/// );
/// let estimate = estimator.estimate(&query).await;
/// assert_eq!(estimate.source, EstimateSource::Estimated);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct RouteEstimator {
    service: Option<Arc<dyn RoutingService>>,
    config: EstimatorConfig,
}

impl std::fmt::Debug for RouteEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteEstimator")
            .field("service", &self.service.as_ref().map(|_| "<dyn RoutingService>"))
            .field("config", &self.config)
            .finish()
    }
}

impl RouteEstimator {
    /// Estimator with no live routing; every answer is analytic.
    #[must_use]
    pub fn offline() -> Self {
        Self::default()
    }

    /// Estimator that consults `service` before falling back.
    #[must_use]
    pub fn with_service(service: Arc<dyn RoutingService>, config: EstimatorConfig) -> Self {
        Self {
            service: Some(service),
            config,
        }
    }

    /// Whether a live routing service is configured.
    #[must_use]
    pub const fn has_live_service(&self) -> bool {
        self.service.is_some()
    }

    /// Estimate distance and duration for `query`. Never fails.
    pub async fn estimate(&self, query: &RouteQuery) -> RouteEstimate {
        match self.live(query).await {
            Ok(route) => {
                debug!(
                    "live route: {:.0} m, {:.0} s over {} steps",
                    route.distance_meters,
                    route.duration_seconds,
                    route.steps.len()
                );
                RouteEstimate {
                    distance_meters: route.distance_meters,
                    duration_seconds: route.duration_seconds,
                    source: EstimateSource::Live,
                }
            }
            Err(ProviderError::NotConfigured { .. }) => Self::analytic(query),
            Err(error) => {
                warn!("live routing failed, using analytic estimate: {error}");
                Self::analytic(query)
            }
        }
    }

    /// Straight-line estimate at the mode's constant speed.
    #[must_use]
    pub fn analytic(query: &RouteQuery) -> RouteEstimate {
        let distance_meters = geo_math::distance(query.origin, query.destination);
        RouteEstimate {
            distance_meters,
            duration_seconds: distance_meters / query.mode.speed_mps(),
            source: EstimateSource::Estimated,
        }
    }

    async fn live(&self, query: &RouteQuery) -> Result<LiveRoute, ProviderError> {
        let Some(service) = &self.service else {
            return Err(ProviderError::NotConfigured {
                what: "live routing service".to_owned(),
            });
        };
        let route = with_timeout(
            self.config.live_timeout,
            service.route(query.origin, query.destination, query.mode),
        )
        .await?;
        if route.is_plausible() {
            Ok(route)
        } else {
            Err(ProviderError::Parse {
                message: format!(
                    "implausible route totals ({} m, {} s)",
                    route.distance_meters, route.duration_seconds
                ),
            })
        }
    }
}
