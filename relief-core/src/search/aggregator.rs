//! First-non-empty-wins search across an ordered strategy list.

use std::collections::HashSet;
use std::time::Duration;

use log::{debug, warn};
use thiserror::Error;

use super::{SearchQuery, SearchStrategy, StrategyKind};
use crate::provider::with_timeout;
use crate::{PointOfInterest, ProviderError, RawPoi, geo_math};

/// Default allowance for a single strategy call.
pub const DEFAULT_STRATEGY_TIMEOUT: Duration = Duration::from_secs(8);

/// Configuration for [`PoiSearchAggregator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Time allowance for each strategy call.
    pub strategy_timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            strategy_timeout: DEFAULT_STRATEGY_TIMEOUT,
        }
    }
}

impl SearchConfig {
    /// Set the per-strategy timeout.
    #[must_use]
    pub const fn with_strategy_timeout(mut self, timeout: Duration) -> Self {
        self.strategy_timeout = timeout;
        self
    }
}

/// A strategy that raised an error or timed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyFailure {
    /// Strategy name.
    pub strategy: String,
    /// Failure reported by the strategy or the timeout guard.
    pub error: ProviderError,
}

/// Errors returned by [`PoiSearchAggregator::search`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The aggregator was called without any strategies.
    #[error("no search strategies were configured")]
    NoStrategies,
    /// Every strategy raised an error or timed out.
    #[error("all {} search strategies failed", failures.len())]
    AllStrategiesFailed {
        /// One entry per strategy, in attempt order.
        failures: Vec<StrategyFailure>,
    },
}

/// Detailed outcome of a search.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchReport {
    /// Normalised results, possibly empty.
    pub pois: Vec<PointOfInterest>,
    /// Name of the strategy that produced `pois`, if any did.
    pub strategy: Option<String>,
    /// Strategies that failed before the winning one.
    pub failures: Vec<StrategyFailure>,
    /// Strategies that answered but contributed no usable points.
    pub empty: Vec<String>,
}

/// Queries strategies in priority order and returns the first usable set.
///
/// Each strategy is attempted at most once. A strategy that errors or times
/// out is logged and skipped; one that answers with nothing usable after
/// normalisation is treated the same way, so an empty but well-formed
/// response never hides a richer source further down the list.
#[derive(Debug, Clone, Default)]
pub struct PoiSearchAggregator {
    config: SearchConfig,
}

impl PoiSearchAggregator {
    /// Create an aggregator with the given configuration.
    #[must_use]
    pub const fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    /// Run the fallback chain and return the winning result set.
    ///
    /// Returns an empty vector when at least one strategy answered but none
    /// produced a usable point.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::AllStrategiesFailed`] when every strategy failed
    /// and [`SearchError::NoStrategies`] when `strategies` is empty.
    pub async fn search(
        &self,
        query: &SearchQuery,
        strategies: &[Box<dyn SearchStrategy>],
    ) -> Result<Vec<PointOfInterest>, SearchError> {
        self.search_detailed(query, strategies)
            .await
            .map(|report| report.pois)
    }

    /// Run the fallback chain and report which strategy answered.
    ///
    /// # Errors
    ///
    /// See [`PoiSearchAggregator::search`].
    pub async fn search_detailed(
        &self,
        query: &SearchQuery,
        strategies: &[Box<dyn SearchStrategy>],
    ) -> Result<SearchReport, SearchError> {
        if strategies.is_empty() {
            return Err(SearchError::NoStrategies);
        }

        let mut report = SearchReport::default();
        for strategy in strategies {
            let name = strategy.name();
            let outbound = match strategy.kind() {
                StrategyKind::Remote => query.for_remote_provider(),
                StrategyKind::Local => *query,
            };
            let fetched =
                with_timeout(self.config.strategy_timeout, strategy.fetch(&outbound)).await;

            match fetched {
                Ok(raw) => {
                    let received = raw.len();
                    let pois = normalise(raw, query);
                    if pois.is_empty() {
                        debug!("search strategy {name} returned {received} records, none usable");
                        report.empty.push(name.to_owned());
                        continue;
                    }
                    debug!(
                        "search strategy {name} produced {} of {received} records",
                        pois.len()
                    );
                    report.pois = pois;
                    report.strategy = Some(name.to_owned());
                    return Ok(report);
                }
                Err(error) => {
                    warn!("search strategy {name} failed: {error}");
                    report.failures.push(StrategyFailure {
                        strategy: name.to_owned(),
                        error,
                    });
                }
            }
        }

        if report.empty.is_empty() {
            return Err(SearchError::AllStrategiesFailed {
                failures: report.failures,
            });
        }
        Ok(report)
    }
}

/// Validate, measure, filter, de-duplicate, sort and truncate raw records.
///
/// Malformed coordinates drop only the offending record. The radius check
/// uses the caller's original radius and the unrounded distance; the stored
/// distance is rounded to whole metres and drives a stable sort.
pub(crate) fn normalise(raw: Vec<RawPoi>, query: &SearchQuery) -> Vec<PointOfInterest> {
    let center = query.center();
    let mut measured: Vec<PointOfInterest> = raw
        .into_iter()
        .filter_map(RawPoi::into_poi)
        .filter_map(|poi| {
            let distance = geo_math::distance(center, poi.coordinate);
            (distance <= query.radius_meters()).then(|| poi.with_distance(distance.round()))
        })
        .collect();

    measured.sort_by(|lhs, rhs| {
        let left = lhs.distance_meters.unwrap_or(f64::INFINITY);
        let right = rhs.distance_meters.unwrap_or(f64::INFINITY);
        left.total_cmp(&right)
    });

    let mut seen = HashSet::new();
    measured.retain(|poi| seen.insert(poi.id.clone()));
    measured.truncate(query.result_limit());
    measured
}
