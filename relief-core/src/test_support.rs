//! Scripted collaborators used by unit and behaviour tests.
//!
//! Each stub counts its calls so tests can assert on the fallback chain's
//! short-circuiting, and can be delayed to exercise timeout handling under
//! a paused Tokio clock.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::navigation::{LaunchError, LinkLauncher, ProbeResult};
use crate::{
    Coordinate, LiveRoute, ProviderError, RawPoi, RoutingService, SearchQuery, SearchStrategy,
    StrategyKind, TravelMode,
};

async fn pause(delay: Option<Duration>) {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

/// `SearchStrategy` returning a fixed response.
#[derive(Debug)]
pub struct StubSearchStrategy {
    name: String,
    kind: StrategyKind,
    response: Result<Vec<RawPoi>, ProviderError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_radius: Mutex<Option<f64>>,
}

impl StubSearchStrategy {
    /// A remote strategy answering with `records`.
    pub fn with_records(name: impl Into<String>, records: Vec<RawPoi>) -> Self {
        Self::new(name, Ok(records))
    }

    /// A remote strategy answering with no records.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Ok(Vec::new()))
    }

    /// A remote strategy failing with `error`.
    pub fn failing(name: impl Into<String>, error: ProviderError) -> Self {
        Self::new(name, Err(error))
    }

    fn new(name: impl Into<String>, response: Result<Vec<RawPoi>, ProviderError>) -> Self {
        Self {
            name: name.into(),
            kind: StrategyKind::Remote,
            response,
            delay: None,
            calls: AtomicUsize::new(0),
            last_radius: Mutex::new(None),
        }
    }

    /// Mark the strategy as local so it receives the caller's radius.
    #[must_use]
    pub fn local(mut self) -> Self {
        self.kind = StrategyKind::Local;
        self
    }

    /// Sleep for `delay` before answering.
    #[must_use]
    pub fn delayed_by(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `fetch` calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Radius carried by the most recent query.
    pub fn last_radius(&self) -> Option<f64> {
        self.last_radius.lock().ok().and_then(|radius| *radius)
    }
}

#[async_trait]
impl SearchStrategy for StubSearchStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> StrategyKind {
        self.kind
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<RawPoi>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut radius) = self.last_radius.lock() {
            *radius = Some(query.radius_meters());
        }
        pause(self.delay).await;
        self.response.clone()
    }
}

/// `RoutingService` answering from a script.
///
/// Scripted responses are consumed in order; once exhausted every call
/// returns the fallback response.
#[derive(Debug)]
pub struct StubRoutingService {
    script: Mutex<VecDeque<Result<LiveRoute, ProviderError>>>,
    fallback: Result<LiveRoute, ProviderError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StubRoutingService {
    /// Answer every call with `route`.
    #[must_use]
    pub fn with_route(route: LiveRoute) -> Self {
        Self::scripted(Vec::new(), Ok(route))
    }

    /// Fail every call with `error`.
    #[must_use]
    pub fn with_error(error: ProviderError) -> Self {
        Self::scripted(Vec::new(), Err(error))
    }

    /// Answer calls with `responses` in order, then fail.
    #[must_use]
    pub fn with_sequence(responses: Vec<Result<LiveRoute, ProviderError>>) -> Self {
        Self::scripted(
            responses,
            Err(ProviderError::Service {
                code: "exhausted".to_owned(),
                message: "no scripted responses left".to_owned(),
            }),
        )
    }

    fn scripted(
        responses: Vec<Result<LiveRoute, ProviderError>>,
        fallback: Result<LiveRoute, ProviderError>,
    ) -> Self {
        Self {
            script: Mutex::new(responses.into()),
            fallback,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Sleep for `delay` before answering.
    #[must_use]
    pub fn delayed_by(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `route` calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoutingService for StubRoutingService {
    async fn route(
        &self,
        _origin: Coordinate,
        _destination: Coordinate,
        _mode: TravelMode,
    ) -> Result<LiveRoute, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        pause(self.delay).await;
        let scripted = self
            .script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front());
        scripted.unwrap_or_else(|| self.fallback.clone())
    }
}

#[derive(Debug, Clone)]
enum Acceptance {
    Everything,
    Schemes(Vec<String>),
}

impl Acceptance {
    fn accepts(&self, uri: &str) -> bool {
        match self {
            Self::Everything => true,
            Self::Schemes(schemes) => schemes.iter().any(|s| s == scheme_of(uri)),
        }
    }

    fn add(&mut self, scheme: &str) {
        if let Self::Schemes(schemes) = self {
            schemes.push(scheme.to_owned());
        }
    }
}

fn scheme_of(uri: &str) -> &str {
    uri.split_once(':').map_or(uri, |(scheme, _)| scheme)
}

/// `LinkLauncher` accepting URIs by scheme.
///
/// `invoke_application` failures report [`LaunchError::Rejected`] and
/// `open_link` failures report [`LaunchError::NoHandler`].
#[derive(Debug)]
pub struct ScriptedLauncher {
    invoke: Acceptance,
    open: Acceptance,
    unavailable: Vec<String>,
    invoked: Mutex<Vec<String>>,
    opened: Mutex<Vec<String>>,
}

impl ScriptedLauncher {
    fn new(invoke: Acceptance) -> Self {
        Self {
            invoke,
            open: Acceptance::Schemes(Vec::new()),
            unavailable: Vec::new(),
            invoked: Mutex::new(Vec::new()),
            opened: Mutex::new(Vec::new()),
        }
    }

    /// Launch every URI through `invoke_application`.
    #[must_use]
    pub fn accepting_all() -> Self {
        Self::new(Acceptance::Everything)
    }

    /// Refuse every URI on both paths.
    #[must_use]
    pub fn rejecting_all() -> Self {
        Self::new(Acceptance::Schemes(Vec::new()))
    }

    /// Launch only URIs with `scheme` through `invoke_application`.
    #[must_use]
    pub fn accepting_scheme(scheme: &str) -> Self {
        Self::new(Acceptance::Schemes(vec![scheme.to_owned()]))
    }

    /// Additionally accept `scheme` through `open_link`.
    #[must_use]
    pub fn with_open_link_accepting(mut self, scheme: &str) -> Self {
        self.open.add(scheme);
        self
    }

    /// Report `scheme` as having no handler when probed.
    #[must_use]
    pub fn with_unavailable_scheme(mut self, scheme: &str) -> Self {
        self.unavailable.push(scheme.to_owned());
        self
    }

    /// URIs passed to `invoke_application`, in call order.
    pub fn invoked(&self) -> Vec<String> {
        self.invoked.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// URIs passed to `open_link`, in call order.
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LinkLauncher for ScriptedLauncher {
    async fn probe(&self, uri: &str) -> ProbeResult {
        if self.unavailable.iter().any(|s| s == scheme_of(uri)) {
            ProbeResult::Unavailable
        } else {
            ProbeResult::Available
        }
    }

    async fn invoke_application(&self, uri: &str) -> Result<(), LaunchError> {
        if let Ok(mut invoked) = self.invoked.lock() {
            invoked.push(uri.to_owned());
        }
        if self.invoke.accepts(uri) {
            Ok(())
        } else {
            Err(LaunchError::Rejected {
                uri: uri.to_owned(),
            })
        }
    }

    async fn open_link(&self, uri: &str) -> Result<(), LaunchError> {
        if let Ok(mut opened) = self.opened.lock() {
            opened.push(uri.to_owned());
        }
        if self.open.accepts(uri) {
            Ok(())
        } else {
            Err(LaunchError::NoHandler {
                uri: uri.to_owned(),
            })
        }
    }
}
