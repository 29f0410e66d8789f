//! Ordered launch attempts over a deep-link candidate list.

use std::sync::Arc;

use log::{debug, info, warn};

use super::{
    DispatchOutcome, FailedAttempt, LinkCandidate, LinkLauncher, ProbeResult, build_candidates,
};
use crate::journal::{LogRecord, LogStore};
use crate::settings::SettingsStore;
use crate::{PointOfInterest, TravelMode};

/// Position of the dispatcher in its attempt sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// Nothing attempted yet.
    Idle,
    /// Asking the platform whether candidate `i` can be opened.
    Probing(usize),
    /// Trying both launch paths for candidate `i`.
    Launching(usize),
    /// Candidate `i` opened.
    Succeeded(usize),
    /// Every candidate was skipped or failed.
    Exhausted,
}

impl DispatchState {
    const fn after(index: usize, total: usize) -> Self {
        if index + 1 < total {
            Self::Probing(index + 1)
        } else {
            Self::Exhausted
        }
    }
}

/// Opens the user's preferred navigation app, falling back through every
/// known alternative.
///
/// Candidates are attempted strictly in rank order. For each one the
/// launcher is probed first; a negative probe skips the candidate without
/// counting it as a failure. Otherwise the application-invocation path is
/// tried, then the generic link path, and the candidate fails only if both
/// do. Exhaustion writes a single record to the [`LogStore`].
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use relief_core::navigation::NavigationDispatcher;
/// use relief_core::journal::MemoryLogStore;
/// use relief_core::test_support::ScriptedLauncher;
/// use relief_core::{Coordinate, PointOfInterest, TravelMode};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), relief_core::CoordinateError> {
/// let launcher = Arc::new(ScriptedLauncher::accepting_scheme("baidumap"));
/// let dispatcher = NavigationDispatcher::new(launcher, Arc::new(MemoryLogStore::new()));
/// let poi = PointOfInterest::new("1", "WC", "", Coordinate::try_new(31.2317, 121.4750)?);
///
/// let outcome = dispatcher.dispatch(&poi, TravelMode::Walking, "amap").await;
///
/// assert!(outcome.succeeded_uri.is_some_and(|uri| uri.starts_with("baidumap://")));
/// assert_eq!(outcome.attempted.len(), 3);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct NavigationDispatcher {
    launcher: Arc<dyn LinkLauncher>,
    log: Arc<dyn LogStore>,
}

impl std::fmt::Debug for NavigationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationDispatcher").finish_non_exhaustive()
    }
}

impl NavigationDispatcher {
    /// Build a dispatcher from its platform and logging collaborators.
    #[must_use]
    pub fn new(launcher: Arc<dyn LinkLauncher>, log: Arc<dyn LogStore>) -> Self {
        Self { launcher, log }
    }

    /// Open navigation to `destination`, preferring `preferred_engine`.
    pub async fn dispatch(
        &self,
        destination: &PointOfInterest,
        mode: TravelMode,
        preferred_engine: &str,
    ) -> DispatchOutcome {
        let candidates = build_candidates(destination, mode, preferred_engine);
        self.dispatch_candidates(destination, &candidates, preferred_engine)
            .await
    }

    /// As [`dispatch`](Self::dispatch), reading the preference from `settings`.
    pub async fn dispatch_with_settings(
        &self,
        destination: &PointOfInterest,
        mode: TravelMode,
        settings: &dyn SettingsStore,
    ) -> DispatchOutcome {
        let preferred = settings.preferred_engine();
        self.dispatch(destination, mode, &preferred).await
    }

    /// Walk an explicit candidate list in order.
    ///
    /// `preferred_engine` is only used for the exhaustion record.
    pub async fn dispatch_candidates(
        &self,
        destination: &PointOfInterest,
        candidates: &[LinkCandidate],
        preferred_engine: &str,
    ) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        let total = candidates.len();
        let mut state = DispatchState::Idle;

        loop {
            debug!("dispatch state {state:?}");
            state = match state {
                DispatchState::Idle if total == 0 => DispatchState::Exhausted,
                DispatchState::Idle => DispatchState::Probing(0),
                DispatchState::Probing(index) => {
                    let Some(candidate) = candidates.get(index) else {
                        break;
                    };
                    match self.launcher.probe(&candidate.uri).await {
                        ProbeResult::Unavailable => {
                            debug!("no handler for {}; skipping", candidate.uri);
                            outcome.skipped.push(candidate.uri.clone());
                            DispatchState::after(index, total)
                        }
                        ProbeResult::Available | ProbeResult::Unknown => {
                            DispatchState::Launching(index)
                        }
                    }
                }
                DispatchState::Launching(index) => {
                    let Some(candidate) = candidates.get(index) else {
                        break;
                    };
                    match self.launch(&candidate.uri).await {
                        Ok(()) => DispatchState::Succeeded(index),
                        Err(reason) => {
                            debug!("candidate {} failed: {reason}", candidate.uri);
                            outcome.attempted.push(FailedAttempt {
                                uri: candidate.uri.clone(),
                                reason,
                            });
                            DispatchState::after(index, total)
                        }
                    }
                }
                DispatchState::Succeeded(index) => {
                    if let Some(candidate) = candidates.get(index) {
                        info!("opened {} via {}", destination.id, candidate.engine);
                        outcome.succeeded_uri = Some(candidate.uri.clone());
                    }
                    return outcome;
                }
                DispatchState::Exhausted => break,
            };
        }

        self.record_exhaustion(destination, candidates, preferred_engine, &outcome)
            .await;
        outcome
    }

    async fn launch(&self, uri: &str) -> Result<(), String> {
        let invoke_error = match self.launcher.invoke_application(uri).await {
            Ok(()) => return Ok(()),
            Err(error) => error,
        };
        match self.launcher.open_link(uri).await {
            Ok(()) => Ok(()),
            Err(open_error) => Err(format!("invoke: {invoke_error}; open: {open_error}")),
        }
    }

    async fn record_exhaustion(
        &self,
        destination: &PointOfInterest,
        candidates: &[LinkCandidate],
        preferred_engine: &str,
        outcome: &DispatchOutcome,
    ) {
        let mut engines: Vec<&str> = Vec::new();
        for candidate in candidates {
            if !engines.contains(&candidate.engine.as_str()) {
                engines.push(candidate.engine.as_str());
            }
        }
        let message = format!(
            "no navigation app could be launched for {} (preferred engine {preferred_engine}; \
             tried {}; {} failed, {} skipped)",
            destination.id,
            engines.join(", "),
            outcome.attempted.len(),
            outcome.skipped.len()
        );
        warn!("{message}");
        let record = LogRecord::now(destination.coordinate, message);
        let log = Arc::clone(&self.log);
        match tokio::task::spawn_blocking(move || log.append_entry(record)).await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => warn!("failed to record dispatch failure: {error}"),
            Err(error) => warn!("dispatch failure log writer did not finish: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Coordinate;
    use crate::journal::{LogError, MemoryLogStore};
    use crate::navigation::LaunchError;
    use crate::settings::StaticSettings;
    use crate::test_support::ScriptedLauncher;
    use rstest::{fixture, rstest};

    #[fixture]
    fn destination() -> PointOfInterest {
        let coordinate = Coordinate::try_new(31.2317, 121.4750).expect("valid coordinate");
        PointOfInterest::new("seed-1", "People's Square WC", "", coordinate)
    }

    fn dispatcher(launcher: &Arc<ScriptedLauncher>) -> (NavigationDispatcher, Arc<MemoryLogStore>) {
        let log = Arc::new(MemoryLogStore::new());
        (
            NavigationDispatcher::new(launcher.clone(), log.clone()),
            log,
        )
    }

    #[rstest]
    #[tokio::test]
    async fn first_accepted_candidate_wins(destination: PointOfInterest) {
        let launcher = Arc::new(ScriptedLauncher::accepting_all());
        let (dispatcher, log) = dispatcher(&launcher);

        let outcome = dispatcher
            .dispatch(&destination, TravelMode::Walking, "apple")
            .await;

        let uri = outcome.succeeded_uri.expect("first candidate opens");
        assert!(uri.starts_with("maps://"), "{uri}");
        assert!(outcome.attempted.is_empty());
        assert!(log.entries().is_empty());
        assert_eq!(launcher.invoked(), [uri]);
    }

    #[rstest]
    #[tokio::test]
    async fn exhaustion_records_one_entry(destination: PointOfInterest) {
        let launcher = Arc::new(ScriptedLauncher::rejecting_all());
        let (dispatcher, log) = dispatcher(&launcher);
        let candidates = build_candidates(&destination, TravelMode::Walking, "amap");

        let outcome = dispatcher
            .dispatch(&destination, TravelMode::Walking, "amap")
            .await;

        assert!(outcome.succeeded_uri.is_none());
        assert_eq!(outcome.attempted.len(), candidates.len());
        let entries = log.entries();
        assert_eq!(entries.len(), 1);
        let entry = entries.first().expect("one entry");
        assert_eq!(entry.coordinate, destination.coordinate);
        assert!(entry.message.contains("preferred engine amap"));
    }

    #[derive(Default)]
    struct ThreadRecordingLog {
        writers: std::sync::Mutex<Vec<std::thread::ThreadId>>,
    }

    impl LogStore for ThreadRecordingLog {
        fn append_entry(&self, _record: LogRecord) -> Result<(), LogError> {
            self.writers
                .lock()
                .map_err(|_| LogError::Poisoned)?
                .push(std::thread::current().id());
            Ok(())
        }
    }

    #[rstest]
    #[tokio::test]
    async fn exhaustion_is_written_off_the_async_thread(destination: PointOfInterest) {
        let log = Arc::new(ThreadRecordingLog::default());
        let dispatcher =
            NavigationDispatcher::new(Arc::new(ScriptedLauncher::rejecting_all()), log.clone());

        dispatcher
            .dispatch(&destination, TravelMode::Walking, "amap")
            .await;

        let writers = log.writers.lock().expect("writers lock").clone();
        assert_eq!(writers.len(), 1);
        assert_ne!(writers.first(), Some(&std::thread::current().id()));
    }

    #[rstest]
    #[tokio::test]
    async fn open_link_rescues_failed_invocation(destination: PointOfInterest) {
        let launcher = Arc::new(ScriptedLauncher::rejecting_all().with_open_link_accepting("maps"));
        let (dispatcher, _log) = dispatcher(&launcher);

        let outcome = dispatcher
            .dispatch(&destination, TravelMode::Walking, "apple")
            .await;

        assert!(outcome.succeeded_uri.is_some_and(|uri| uri.starts_with("maps://")));
        assert!(outcome.attempted.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn negative_probe_skips_without_failure(destination: PointOfInterest) {
        let launcher = Arc::new(
            ScriptedLauncher::accepting_all()
                .with_unavailable_scheme("amapuri")
                .with_unavailable_scheme("iosamap"),
        );
        let (dispatcher, _log) = dispatcher(&launcher);

        let outcome = dispatcher
            .dispatch(&destination, TravelMode::Walking, "amap")
            .await;

        assert_eq!(outcome.skipped.len(), 2);
        assert!(outcome.attempted.is_empty());
        assert!(
            outcome
                .succeeded_uri
                .is_some_and(|uri| uri.starts_with("androidamap://"))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn failure_reason_names_both_paths(destination: PointOfInterest) {
        let launcher = Arc::new(ScriptedLauncher::accepting_scheme("baidumap"));
        let (dispatcher, _log) = dispatcher(&launcher);

        let outcome = dispatcher
            .dispatch(&destination, TravelMode::Cycling, "amap")
            .await;

        let first = outcome.attempted.first().expect("amap variants fail first");
        assert!(first.reason.starts_with("invoke: "));
        assert!(first.reason.contains("; open: "));
        let rejected = LaunchError::Rejected {
            uri: first.uri.clone(),
        };
        assert!(first.reason.contains(&rejected.to_string()));
    }

    #[rstest]
    #[tokio::test]
    async fn settings_supply_the_preference(destination: PointOfInterest) {
        let launcher = Arc::new(ScriptedLauncher::accepting_all());
        let (dispatcher, _log) = dispatcher(&launcher);
        let settings = StaticSettings::new("tencent");

        let outcome = dispatcher
            .dispatch_with_settings(&destination, TravelMode::Walking, &settings)
            .await;

        assert!(outcome.succeeded_uri.is_some_and(|uri| uri.starts_with("qqmap://")));
    }

    #[rstest]
    #[tokio::test]
    async fn empty_candidate_list_is_exhausted(destination: PointOfInterest) {
        let launcher = Arc::new(ScriptedLauncher::accepting_all());
        let (dispatcher, log) = dispatcher(&launcher);

        let outcome = dispatcher.dispatch_candidates(&destination, &[], "amap").await;

        assert!(!outcome.succeeded());
        assert_eq!(log.entries().len(), 1);
    }
}
