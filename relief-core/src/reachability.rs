//! Time-budget filtering over distance-sorted candidates.

use log::debug;

use crate::{
    Coordinate, PointOfInterest, RouteEstimate, RouteEstimator, RouteQuery, TravelMode, geo_math,
};

/// A candidate accepted by [`ReachabilityFilter`].
#[derive(Debug, Clone, PartialEq)]
pub struct Reachable {
    /// The accepted point of interest.
    pub poi: PointOfInterest,
    /// Estimate that admitted it; `None` when no budget was applied.
    pub estimate: Option<RouteEstimate>,
}

/// Selects the nearest candidate reachable within a time budget.
///
/// Candidates are evaluated nearest first and the walk stops at the first
/// acceptance, so at most one routing call is made per candidate and usually
/// only one overall. The budget is never widened; when nothing fits the
/// filter returns `None` and the caller decides what to do.
#[derive(Debug, Clone, Default)]
pub struct ReachabilityFilter {
    estimator: RouteEstimator,
}

impl ReachabilityFilter {
    /// Build a filter around `estimator`.
    #[must_use]
    pub const fn new(estimator: RouteEstimator) -> Self {
        Self { estimator }
    }

    /// The estimator consulted for each candidate.
    #[must_use]
    pub const fn estimator(&self) -> &RouteEstimator {
        &self.estimator
    }

    /// Return the nearest candidate whose estimated trip fits the budget.
    ///
    /// With `time_limit_minutes` absent the nearest candidate is returned
    /// without any routing calls.
    pub async fn filter_reachable(
        &self,
        candidates: &[PointOfInterest],
        origin: Coordinate,
        mode: TravelMode,
        time_limit_minutes: Option<f64>,
    ) -> Option<PointOfInterest> {
        self.filter_reachable_with_estimate(candidates, origin, mode, time_limit_minutes)
            .await
            .map(|reachable| reachable.poi)
    }

    /// As [`filter_reachable`](Self::filter_reachable), also returning the
    /// estimate that admitted the candidate.
    pub async fn filter_reachable_with_estimate(
        &self,
        candidates: &[PointOfInterest],
        origin: Coordinate,
        mode: TravelMode,
        time_limit_minutes: Option<f64>,
    ) -> Option<Reachable> {
        let ordered = geo_math::sort_by_distance(candidates, origin);

        let Some(limit) = time_limit_minutes else {
            return ordered.into_iter().next().map(|poi| Reachable {
                poi,
                estimate: None,
            });
        };

        for poi in ordered {
            let query = RouteQuery::new(origin, poi.coordinate, mode).with_time_limit(limit);
            let estimate = self.estimator.estimate(&query).await;
            if estimate.duration_minutes() <= limit {
                debug!(
                    "{} reachable in {:.1} min ({:?})",
                    poi.id,
                    estimate.duration_minutes(),
                    estimate.source
                );
                return Some(Reachable {
                    poi,
                    estimate: Some(estimate),
                });
            }
            debug!(
                "{} needs {:.1} min, over the {limit} min budget",
                poi.id,
                estimate.duration_minutes()
            );
        }
        None
    }
}
