//! Open-data restroom search through the Overpass API.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use relief_core::{ProviderError, RawPoi, SearchQuery, SearchStrategy};
use serde::Deserialize;
use url::Url;

use crate::transport::{
    DEFAULT_USER_AGENT, ProviderBuildError, build_client, parse_base_url, read_json,
};

/// Default public Overpass interpreter.
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Name reported when a feature carries no usable name tag.
const UNNAMED: &str = "Public toilet";

/// Configuration for [`OverpassSearchStrategy`].
#[derive(Debug, Clone)]
pub struct OverpassSearchConfig {
    /// Interpreter endpoint.
    pub endpoint: String,
    /// Request timeout; also sent as the server-side query timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for OverpassSearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OVERPASS_URL.to_string(),
            timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl OverpassSearchConfig {
    /// Configuration for `endpoint` with default timeouts.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
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
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<Element>,
    remark: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Element {
    #[serde(rename = "type")]
    kind: String,
    id: u64,
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<Center>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct Center {
    lat: f64,
    lon: f64,
}

impl Element {
    fn into_raw(self) -> RawPoi {
        let (latitude, longitude) = match (self.lat, self.lon, &self.center) {
            (Some(lat), Some(lon), _) => (lat, lon),
            (_, _, Some(center)) => (center.lat, center.lon),
            _ => (f64::NAN, f64::NAN),
        };
        let name = ["name", "name:en", "operator"]
            .iter()
            .find_map(|key| self.tags.get(*key).filter(|value| !value.is_empty()))
            .cloned()
            .unwrap_or_else(|| UNNAMED.to_owned());
        let address = [
            self.tags.get("addr:housenumber"),
            self.tags.get("addr:street"),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(" ");
        RawPoi::new(
            format!("osm-{}-{}", self.kind, self.id),
            name,
            address,
            latitude,
            longitude,
        )
    }
}

/// Build the Overpass QL query for toilets around `query.center()`.
///
/// Ways are included through their centre point so that mapped buildings
/// are found as well as nodes.
fn build_query(query: &SearchQuery, timeout: Duration) -> String {
    let center = query.center();
    let around = format!(
        "(around:{:.0},{:.6},{:.6})",
        query.radius_meters(),
        center.latitude(),
        center.longitude()
    );
    format!(
        "[out:json][timeout:{}];(node[\"amenity\"=\"toilets\"]{around};way[\"amenity\"=\"toilets\"]{around};);out center;",
        timeout.as_secs().max(1)
    )
}

/// Remote open-data search over OpenStreetMap.
#[derive(Debug)]
pub struct OverpassSearchStrategy {
    client: Client,
    endpoint: Url,
    config: OverpassSearchConfig,
}

impl OverpassSearchStrategy {
    /// Build the strategy.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is invalid or the HTTP client fails
    /// to build.
    pub fn new(config: OverpassSearchConfig) -> Result<Self, ProviderBuildError> {
        let mut endpoint = parse_base_url(&config.endpoint)?;
        // `parse_base_url` appends a slash for joins; the interpreter is a
        // leaf resource.
        let path = endpoint.path().trim_end_matches('/').to_owned();
        endpoint.set_path(&path);
        let client = build_client(&config.user_agent, config.timeout)?;
        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    fn convert_response(response: OverpassResponse) -> Result<Vec<RawPoi>, ProviderError> {
        if response.elements.is_empty() {
            if let Some(remark) = response.remark.filter(|r| r.contains("error")) {
                return Err(ProviderError::Service {
                    code: "remark".to_owned(),
                    message: remark,
                });
            }
        }
        Ok(response.elements.into_iter().map(Element::into_raw).collect())
    }
}

#[async_trait]
impl SearchStrategy for OverpassSearchStrategy {
    fn name(&self) -> &str {
        "overpass"
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<RawPoi>, ProviderError> {
        let ql = build_query(query, self.config.timeout);
        debug!("overpass query: {ql}");
        let sent = self
            .client
            .post(self.endpoint.clone())
            .form(&[("data", ql.as_str())])
            .send()
            .await;
        let response: OverpassResponse =
            read_json(sent, self.endpoint.as_str(), self.config.timeout).await?;
        Self::convert_response(response)
    }
}
