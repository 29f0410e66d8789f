//! One "find and navigate" action from location fix to app launch.
//!
//! A [`Journey`] wires the search, reachability and dispatch stages
//! together and turns their results into a [`JourneyOutcome`] suitable for
//! user-facing messaging. Provider failures never surface here; the only
//! errors are unmet location preconditions, an invalid request, total
//! search failure and cancellation.

use std::sync::Arc;

use log::info;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::navigation::{DispatchOutcome, NavigationDispatcher};
use crate::search::{
    PoiSearchAggregator, SearchError, SearchQuery, SearchQueryError, SearchStrategy,
};
use crate::settings::SettingsStore;
use crate::{
    Coordinate, PointOfInterest, ReachabilityFilter, RouteEstimate, RouteQuery, TravelMode,
};

/// Default search radius for a journey.
pub const DEFAULT_RADIUS_METERS: f64 = 1500.0;

/// Default number of candidates kept after search.
pub const DEFAULT_RESULT_LIMIT: usize = 10;

/// What the location collaborator reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationStatus {
    /// A fix is available.
    Available(Coordinate),
    /// The user declined location access.
    PermissionDenied,
    /// Location services are switched off.
    ServiceDisabled,
}

/// Parameters of a journey, independent of the user's position.
#[derive(Debug, Clone, PartialEq)]
pub struct JourneyRequest {
    /// Search radius in metres.
    pub radius_meters: f64,
    /// Maximum number of candidates considered.
    pub result_limit: usize,
    /// Travel mode for estimates and deep links.
    pub mode: TravelMode,
    /// Optional time budget in minutes.
    pub time_limit_minutes: Option<f64>,
}

impl Default for JourneyRequest {
    fn default() -> Self {
        Self {
            radius_meters: DEFAULT_RADIUS_METERS,
            result_limit: DEFAULT_RESULT_LIMIT,
            mode: TravelMode::default(),
            time_limit_minutes: None,
        }
    }
}

/// Terminal state of a completed journey.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "status", rename_all = "snake_case"))]
pub enum JourneyOutcome {
    /// No restroom was found within the radius.
    NoResults,
    /// Restrooms were found but none fits the time budget.
    NoReachableCandidate,
    /// A navigation app was opened.
    Dispatched {
        /// URI that launched.
        uri: String,
    },
    /// Every navigation candidate failed.
    NavigationUnavailable,
}

impl JourneyOutcome {
    /// Message suitable for showing to the user.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::NoResults => "Nothing usable found nearby.",
            Self::NoReachableCandidate => "Nothing usable found nearby within your time limit.",
            Self::Dispatched { .. } => "Navigation started.",
            Self::NavigationUnavailable => "Couldn't open a navigation app.",
        }
    }
}

/// Everything a journey learnt on the way to its outcome.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JourneyReport {
    /// Distance-sorted search results.
    pub candidates: Vec<PointOfInterest>,
    /// Name of the search strategy that produced the candidates.
    pub search_strategy: Option<String>,
    /// The restroom navigation was requested for.
    pub destination: Option<PointOfInterest>,
    /// Trip estimate for `destination`.
    pub estimate: Option<RouteEstimate>,
    /// Launch details, present once dispatch ran.
    pub dispatch: Option<DispatchOutcome>,
    /// Terminal state.
    pub outcome: JourneyOutcome,
}

/// Preconditions and failures that stop a journey early.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JourneyError {
    /// Location access was refused.
    #[error("location permission denied")]
    PermissionDenied,
    /// Location services are disabled.
    #[error("location services disabled")]
    ServiceDisabled,
    /// The request could not be turned into a search.
    #[error("invalid journey request: {0}")]
    InvalidRequest(#[from] SearchQueryError),
    /// No search strategy could answer.
    #[error("search failed: {0}")]
    Search(#[from] SearchError),
    /// The enclosing action was cancelled.
    #[error("journey cancelled")]
    Cancelled,
}

impl JourneyError {
    /// Message suitable for showing to the user.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "Allow location access to find a restroom nearby.",
            Self::ServiceDisabled => "Turn on location services to find a restroom nearby.",
            Self::InvalidRequest(_) | Self::Search(_) => "Nothing usable found nearby.",
            Self::Cancelled => "Search cancelled.",
        }
    }
}

/// Search, filter and dispatch for one user action.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use relief_core::journey::{Journey, JourneyOutcome, JourneyRequest, LocationStatus};
/// use relief_core::journal::MemoryLogStore;
/// use relief_core::navigation::NavigationDispatcher;
/// use relief_core::settings::StaticSettings;
/// use relief_core::test_support::ScriptedLauncher;
/// use relief_core::{Coordinate, SearchStrategy, SeedSearchStrategy};
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dispatcher = NavigationDispatcher::new(
///     Arc::new(ScriptedLauncher::accepting_all()),
///     Arc::new(MemoryLogStore::new()),
/// );
/// let strategies: Vec<Box<dyn SearchStrategy>> = vec![Box::new(SeedSearchStrategy::builtin())];
/// let journey = Journey::new(strategies, dispatcher, Arc::new(StaticSettings::default()));
///
/// let here = LocationStatus::Available(Coordinate::try_new(31.2304, 121.4737)?);
/// let report = journey
///     .run(here, &JourneyRequest::default(), &CancellationToken::new())
///     .await?;
///
/// assert!(matches!(report.outcome, JourneyOutcome::Dispatched { .. }));
/// # Ok(())
/// # }
/// ```
pub struct Journey {
    aggregator: PoiSearchAggregator,
    strategies: Vec<Box<dyn SearchStrategy>>,
    filter: ReachabilityFilter,
    dispatcher: NavigationDispatcher,
    settings: Arc<dyn SettingsStore>,
}

impl std::fmt::Debug for Journey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.strategies.iter().map(|s| s.name()).collect();
        f.debug_struct("Journey")
            .field("aggregator", &self.aggregator)
            .field("strategies", &names)
            .field("filter", &self.filter)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

impl Journey {
    /// Build a journey with default search and offline estimation.
    #[must_use]
    pub fn new(
        strategies: Vec<Box<dyn SearchStrategy>>,
        dispatcher: NavigationDispatcher,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        Self {
            aggregator: PoiSearchAggregator::default(),
            strategies,
            filter: ReachabilityFilter::default(),
            dispatcher,
            settings,
        }
    }

    /// Replace the search aggregator.
    #[must_use]
    pub fn with_aggregator(mut self, aggregator: PoiSearchAggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    /// Replace the reachability filter, typically to add live routing.
    #[must_use]
    pub fn with_filter(mut self, filter: ReachabilityFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Run the journey until it reaches an outcome or `cancel` fires.
    ///
    /// Cancellation drops whichever stage is in flight, abandoning its
    /// network call; no later stage starts.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError`] for unmet location preconditions, invalid
    /// parameters, total search failure, or cancellation.
    pub async fn run(
        &self,
        location: LocationStatus,
        request: &JourneyRequest,
        cancel: &CancellationToken,
    ) -> Result<JourneyReport, JourneyError> {
        let origin = match location {
            LocationStatus::Available(origin) => origin,
            LocationStatus::PermissionDenied => return Err(JourneyError::PermissionDenied),
            LocationStatus::ServiceDisabled => return Err(JourneyError::ServiceDisabled),
        };
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(JourneyError::Cancelled),
            report = self.run_from(origin, request) => report,
        }
    }

    async fn run_from(
        &self,
        origin: Coordinate,
        request: &JourneyRequest,
    ) -> Result<JourneyReport, JourneyError> {
        let query = SearchQuery::new(origin, request.radius_meters, request.result_limit)?;
        let search = self
            .aggregator
            .search_detailed(&query, &self.strategies)
            .await?;

        let mut report = JourneyReport {
            candidates: search.pois,
            search_strategy: search.strategy,
            destination: None,
            estimate: None,
            dispatch: None,
            outcome: JourneyOutcome::NoResults,
        };
        if report.candidates.is_empty() {
            info!("no restrooms within {} m", request.radius_meters);
            return Ok(report);
        }

        let reachable = self
            .filter
            .filter_reachable_with_estimate(
                &report.candidates,
                origin,
                request.mode,
                request.time_limit_minutes,
            )
            .await;
        let Some(reachable) = reachable else {
            report.outcome = JourneyOutcome::NoReachableCandidate;
            return Ok(report);
        };

        let estimate = match reachable.estimate {
            Some(estimate) => estimate,
            None => {
                let trip = RouteQuery::new(origin, reachable.poi.coordinate, request.mode);
                self.filter.estimator().estimate(&trip).await
            }
        };

        let preferred = self.settings.preferred_engine();
        let dispatch = self
            .dispatcher
            .dispatch(&reachable.poi, request.mode, &preferred)
            .await;

        report.outcome = match &dispatch.succeeded_uri {
            Some(uri) => JourneyOutcome::Dispatched { uri: uri.clone() },
            None => JourneyOutcome::NavigationUnavailable,
        };
        report.destination = Some(reachable.poi);
        report.estimate = Some(estimate);
        report.dispatch = Some(dispatch);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::MemoryLogStore;
    use crate::settings::StaticSettings;
    use crate::test_support::{ScriptedLauncher, StubSearchStrategy};
    use crate::{EstimateSource, ProviderError, RawPoi, SeedSearchStrategy};
    use rstest::{fixture, rstest};
    use std::time::Duration;

    #[fixture]
    fn here() -> LocationStatus {
        LocationStatus::Available(Coordinate::try_new(31.2304, 121.4737).expect("valid coordinate"))
    }

    fn journey(
        strategies: Vec<Box<dyn SearchStrategy>>,
        launcher: ScriptedLauncher,
    ) -> (Journey, Arc<MemoryLogStore>) {
        let log = Arc::new(MemoryLogStore::new());
        let dispatcher = NavigationDispatcher::new(Arc::new(launcher), log.clone());
        let journey = Journey::new(strategies, dispatcher, Arc::new(StaticSettings::new("baidu")));
        (journey, log)
    }

    fn seed() -> Vec<Box<dyn SearchStrategy>> {
        vec![Box::new(SeedSearchStrategy::builtin())]
    }

    #[rstest]
    #[tokio::test]
    async fn dispatches_to_the_nearest_restroom(here: LocationStatus) {
        let (journey, log) = journey(seed(), ScriptedLauncher::accepting_all());

        let report = journey
            .run(here, &JourneyRequest::default(), &CancellationToken::new())
            .await
            .expect("journey completes");

        let JourneyOutcome::Dispatched { uri } = &report.outcome else {
            panic!("expected dispatch, got {:?}", report.outcome);
        };
        assert!(uri.starts_with("baidumap://"), "{uri}");
        assert_eq!(report.destination.as_ref(), report.candidates.first());
        assert_eq!(report.search_strategy.as_deref(), Some("seed"));
        let estimate = report.estimate.expect("estimate attached");
        assert_eq!(estimate.source, EstimateSource::Estimated);
        assert!(log.entries().is_empty());
    }

    #[rstest]
    #[case(LocationStatus::PermissionDenied, JourneyError::PermissionDenied)]
    #[case(LocationStatus::ServiceDisabled, JourneyError::ServiceDisabled)]
    #[tokio::test]
    async fn location_preconditions_surface(
        #[case] location: LocationStatus,
        #[case] expected: JourneyError,
    ) {
        let (journey, _log) = journey(seed(), ScriptedLauncher::accepting_all());
        let result = journey
            .run(location, &JourneyRequest::default(), &CancellationToken::new())
            .await;
        assert_eq!(result, Err(expected));
    }

    #[rstest]
    #[tokio::test]
    async fn empty_search_reports_no_results(here: LocationStatus) {
        let strategies: Vec<Box<dyn SearchStrategy>> =
            vec![Box::new(StubSearchStrategy::empty("keyword"))];
        let (journey, _log) = journey(strategies, ScriptedLauncher::accepting_all());

        let report = journey
            .run(here, &JourneyRequest::default(), &CancellationToken::new())
            .await
            .expect("empty search is not an error");

        assert_eq!(report.outcome, JourneyOutcome::NoResults);
        assert_eq!(report.outcome.user_message(), "Nothing usable found nearby.");
    }

    #[rstest]
    #[tokio::test]
    async fn budget_too_tight_reports_no_reachable_candidate(here: LocationStatus) {
        let (journey, _log) = journey(seed(), ScriptedLauncher::accepting_all());
        let request = JourneyRequest {
            time_limit_minutes: Some(0.0),
            ..JourneyRequest::default()
        };

        let report = journey
            .run(here, &request, &CancellationToken::new())
            .await
            .expect("journey completes");

        assert_eq!(report.outcome, JourneyOutcome::NoReachableCandidate);
        assert!(report.dispatch.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn launch_exhaustion_is_recoverable(here: LocationStatus) {
        let (journey, log) = journey(seed(), ScriptedLauncher::rejecting_all());

        let report = journey
            .run(here, &JourneyRequest::default(), &CancellationToken::new())
            .await
            .expect("exhaustion is an outcome, not an error");

        assert_eq!(report.outcome, JourneyOutcome::NavigationUnavailable);
        assert_eq!(
            report.outcome.user_message(),
            "Couldn't open a navigation app."
        );
        assert_eq!(log.entries().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn total_search_failure_is_an_error(here: LocationStatus) {
        let strategies: Vec<Box<dyn SearchStrategy>> = vec![Box::new(
            StubSearchStrategy::failing(
                "keyword",
                ProviderError::Parse {
                    message: "bad json".to_owned(),
                },
            ),
        )];
        let (journey, _log) = journey(strategies, ScriptedLauncher::accepting_all());

        let error = journey
            .run(here, &JourneyRequest::default(), &CancellationToken::new())
            .await
            .expect_err("no strategy answered");

        assert!(matches!(error, JourneyError::Search(_)));
        assert_eq!(error.user_message(), "Nothing usable found nearby.");
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn cancellation_abandons_in_flight_search(here: LocationStatus) {
        let stalled = Arc::new(
            StubSearchStrategy::with_records(
                "keyword",
                vec![RawPoi::new("a", "A", "", 31.2312, 121.4747)],
            )
            .delayed_by(Duration::from_secs(5)),
        );
        let seed = Arc::new(StubSearchStrategy::empty("seed").local());
        let strategies: Vec<Box<dyn SearchStrategy>> =
            vec![Box::new(Arc::clone(&stalled)), Box::new(Arc::clone(&seed))];
        let (journey, _log) = journey(strategies, ScriptedLauncher::accepting_all());
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });
        let result = journey.run(here, &JourneyRequest::default(), &cancel).await;

        assert_eq!(result, Err(JourneyError::Cancelled));
        assert_eq!(stalled.calls(), 1);
        assert_eq!(seed.calls(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_radius_is_rejected(here: LocationStatus) {
        let (journey, _log) = journey(seed(), ScriptedLauncher::accepting_all());
        let request = JourneyRequest {
            radius_meters: -5.0,
            ..JourneyRequest::default()
        };

        let result = journey.run(here, &request, &CancellationToken::new()).await;

        assert!(matches!(result, Err(JourneyError::InvalidRequest(_))));
    }
}
