//! HTTP-based `RoutingService` using OSRM's Route API.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use relief_core::{Coordinate, LiveRoute, ProviderError, RouteStep, RoutingService, TravelMode};
use url::Url;

use super::osrm::{RouteResponse, Step};
use crate::transport::{
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, ProviderBuildError, build_client, join,
    parse_base_url, read_json,
};

/// Configuration for [`HttpRoutingService`].
#[derive(Debug, Clone)]
pub struct HttpRoutingServiceConfig {
    /// Base URL for the OSRM service (e.g., `"http://localhost:5000"`).
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// OSRM profile used for walking requests.
    pub walking_profile: String,
    /// OSRM profile used for cycling requests.
    pub cycling_profile: String,
}

impl Default for HttpRoutingServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            walking_profile: "foot".to_string(),
            cycling_profile: "bicycle".to_string(),
        }
    }
}

impl HttpRoutingServiceConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Override the OSRM profile used for `mode`.
    #[must_use]
    pub fn with_profile(mut self, mode: TravelMode, profile: impl Into<String>) -> Self {
        match mode {
            TravelMode::Walking => self.walking_profile = profile.into(),
            TravelMode::Cycling => self.cycling_profile = profile.into(),
        }
        self
    }

    fn profile(&self, mode: TravelMode) -> &str {
        match mode {
            TravelMode::Walking => &self.walking_profile,
            TravelMode::Cycling => &self.cycling_profile,
        }
    }
}

/// Live routing over the OSRM Route API.
///
/// Each call issues one `GET {base}/route/v1/{profile}/{lon,lat;lon,lat}`
/// with step breakdowns enabled. Non-success statuses, malformed bodies,
/// non-`"Ok"` codes and empty route lists all become [`ProviderError`]s,
/// which the estimator turns into an analytic fallback.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use relief_core::{EstimatorConfig, RouteEstimator};
/// use relief_data::routing::HttpRoutingService;
///
/// let service = HttpRoutingService::new("http://localhost:5000")?;
/// let estimator = RouteEstimator::with_service(Arc::new(service), EstimatorConfig::default());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct HttpRoutingService {
    client: Client,
    base: Url,
    config: HttpRoutingServiceConfig,
}

impl HttpRoutingService {
    /// Create a new service with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpRoutingServiceConfig::new(base_url))
    }

    /// Create a new service with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn with_config(config: HttpRoutingServiceConfig) -> Result<Self, ProviderBuildError> {
        let base = parse_base_url(&config.base_url)?;
        let client = build_client(&config.user_agent, config.timeout)?;
        Ok(Self {
            client,
            base,
            config,
        })
    }

    /// Build the OSRM Route API URL for one trip.
    ///
    /// The URL format is:
    /// `{base_url}/route/v1/{profile}/{lon},{lat};{lon},{lat}?overview=false&steps=true`.
    fn build_route_url(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TravelMode,
    ) -> Result<Url, ProviderError> {
        let path = format!(
            "route/v1/{}/{},{};{},{}",
            self.config.profile(mode),
            origin.longitude(),
            origin.latitude(),
            destination.longitude(),
            destination.latitude()
        );
        let mut url = join(&self.base, &path)?;
        url.query_pairs_mut()
            .append_pair("overview", "false")
            .append_pair("steps", "true");
        Ok(url)
    }

    /// Convert an OSRM response to a [`LiveRoute`].
    fn convert_response(response: RouteResponse) -> Result<LiveRoute, ProviderError> {
        if !response.is_ok() {
            return Err(ProviderError::Service {
                code: response.code,
                message: response.message.unwrap_or_default(),
            });
        }

        let route = response
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Service {
                code: "NoRoute".to_string(),
                message: "OSRM returned no routes".to_string(),
            })?;

        let steps = route
            .legs
            .into_iter()
            .flat_map(|leg| leg.steps)
            .map(convert_step)
            .collect();

        Ok(LiveRoute {
            distance_meters: route.distance,
            duration_seconds: route.duration,
            steps,
        })
    }
}

fn convert_step(step: Step) -> RouteStep {
    let mut instruction = step.maneuver.kind;
    if let Some(modifier) = step.maneuver.modifier {
        instruction.push(' ');
        instruction.push_str(&modifier);
    }
    if !step.name.is_empty() {
        instruction.push_str(" onto ");
        instruction.push_str(&step.name);
    }
    RouteStep {
        instruction,
        distance_meters: step.distance,
        duration_seconds: step.duration,
    }
}

#[async_trait]
impl RoutingService for HttpRoutingService {
    async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TravelMode,
    ) -> Result<LiveRoute, ProviderError> {
        let url = self.build_route_url(origin, destination, mode)?;
        debug!("requesting live route from {url}");
        let sent = self.client.get(url.clone()).send().await;
        let response: RouteResponse = read_json(sent, url.as_str(), self.config.timeout).await?;
        Self::convert_response(response)
    }
}
