//! Keyword search against an AMap-style "place around" web API.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use relief_core::{ProviderError, RawPoi, SearchQuery, SearchStrategy};
use serde::Deserialize;
use url::Url;

use crate::transport::{
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, ProviderBuildError, build_client, join,
    parse_base_url, read_json,
};

/// Largest page size the place-around API accepts.
const MAX_PAGE_SIZE: usize = 25;

/// Configuration for [`KeywordSearchStrategy`].
#[derive(Debug, Clone)]
pub struct KeywordSearchConfig {
    /// Base URL of the web service.
    pub base_url: String,
    /// API key; searches fail with [`ProviderError::NotConfigured`] without one.
    pub api_key: Option<String>,
    /// Search keywords.
    pub keywords: String,
    /// Category filter passed as `types`.
    pub category: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for KeywordSearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://restapi.amap.com".to_string(),
            api_key: None,
            keywords: "公共厕所".to_string(),
            category: "200300".to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl KeywordSearchConfig {
    /// Configuration for the default endpoint using `api_key`.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Point the strategy at a different service root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Replace the search keywords.
    #[must_use]
    pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = keywords.into();
        self
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
struct PlaceAroundResponse {
    status: String,
    #[serde(default)]
    info: String,
    #[serde(default)]
    infocode: String,
    #[serde(default)]
    pois: Vec<Place>,
}

#[derive(Debug, Deserialize)]
struct Place {
    id: String,
    name: String,
    // The service sends `[]` instead of an empty string.
    #[serde(default)]
    address: serde_json::Value,
    #[serde(default)]
    location: String,
}

impl Place {
    fn into_raw(self) -> RawPoi {
        let (longitude, latitude) = parse_lon_lat(&self.location);
        let address = match self.address {
            serde_json::Value::String(text) => text,
            _ => String::new(),
        };
        RawPoi::new(self.id, self.name, address, latitude, longitude)
    }
}

/// Parse a `"lon,lat"` pair; unparseable parts become NaN so the aggregator
/// drops the record on its own.
fn parse_lon_lat(location: &str) -> (f64, f64) {
    let mut parts = location.split(',').map(|part| part.trim().parse::<f64>().ok());
    let longitude = parts.next().flatten().unwrap_or(f64::NAN);
    let latitude = parts.next().flatten().unwrap_or(f64::NAN);
    (longitude, latitude)
}

/// Remote keyword search for public toilets.
///
/// Sends `GET {base}/v3/place/around` with `location=lon,lat`, the
/// configured keywords and category, the provider-clamped radius and a page
/// size capped at the service maximum. A `status` other than `"1"` is a
/// [`ProviderError::Service`] carrying the provider's `infocode`.
#[derive(Debug)]
pub struct KeywordSearchStrategy {
    client: Client,
    base: Url,
    config: KeywordSearchConfig,
}

impl KeywordSearchStrategy {
    /// Build the strategy.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails
    /// to build.
    pub fn new(config: KeywordSearchConfig) -> Result<Self, ProviderBuildError> {
        let base = parse_base_url(&config.base_url)?;
        let client = build_client(&config.user_agent, config.timeout)?;
        Ok(Self {
            client,
            base,
            config,
        })
    }

    fn build_url(&self, key: &str, query: &SearchQuery) -> Result<Url, ProviderError> {
        let center = query.center();
        let mut url = join(&self.base, "v3/place/around")?;
        url.query_pairs_mut()
            .append_pair("key", key)
            .append_pair(
                "location",
                &format!("{:.6},{:.6}", center.longitude(), center.latitude()),
            )
            .append_pair("keywords", &self.config.keywords)
            .append_pair("types", &self.config.category)
            .append_pair("radius", &format!("{:.0}", query.radius_meters()))
            .append_pair("offset", &query.result_limit().min(MAX_PAGE_SIZE).to_string())
            .append_pair("page", "1")
            .append_pair("sortrule", "distance")
            .append_pair("extensions", "base");
        Ok(url)
    }

    fn convert_response(response: PlaceAroundResponse) -> Result<Vec<RawPoi>, ProviderError> {
        if response.status != "1" {
            return Err(ProviderError::Service {
                code: response.infocode,
                message: response.info,
            });
        }
        Ok(response.pois.into_iter().map(Place::into_raw).collect())
    }
}

#[async_trait]
impl SearchStrategy for KeywordSearchStrategy {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<RawPoi>, ProviderError> {
        let key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ProviderError::NotConfigured {
                what: "keyword search API key".to_owned(),
            })?;
        let url = self.build_url(key, query)?;
        debug!("keyword search within {:.0} m", query.radius_meters());
        let sent = self.client.get(url.clone()).send().await;
        // The key is a credential; keep it out of error messages.
        let mut redacted = url;
        redacted.set_query(None);
        let response: PlaceAroundResponse =
            read_json(sent, redacted.as_str(), self.config.timeout).await?;
        Self::convert_response(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::parse_json;
    use relief_core::Coordinate;
    use rstest::{fixture, rstest};

    #[fixture]
    fn query() -> SearchQuery {
        let center = Coordinate::try_new(31.2304, 121.4737).expect("valid coordinate");
        SearchQuery::new(center, 1500.0, 40).expect("valid query")
    }

    #[fixture]
    fn strategy() -> KeywordSearchStrategy {
        KeywordSearchStrategy::new(KeywordSearchConfig::new("secret"))
            .expect("strategy should build")
    }

    #[rstest]
    fn url_carries_lon_lat_order_and_capped_page(
        strategy: KeywordSearchStrategy,
        query: SearchQuery,
    ) {
        let url = strategy.build_url("secret", &query).expect("url should build");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let get = |name: &str| {
            pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        };

        assert_eq!(url.path(), "/v3/place/around");
        assert_eq!(get("location"), Some("121.473700,31.230400"));
        assert_eq!(get("radius"), Some("1500"));
        assert_eq!(get("offset"), Some("25"));
        assert_eq!(get("keywords"), Some("公共厕所"));
    }

    #[rstest]
    fn converts_places_and_tolerates_bad_fields() {
        let response: PlaceAroundResponse = parse_json(
            r#"{"status": "1", "info": "OK", "infocode": "10000", "pois": [
                {"id": "B00155", "name": "People's Square WC", "address": "Renmin Avenue",
                 "location": "121.475000,31.231700"},
                {"id": "B00156", "name": "No address", "address": [], "location": "121.4,31.2"},
                {"id": "B00157", "name": "Broken", "address": "", "location": "n/a"}
            ]}"#,
        )
        .expect("should parse");

        let raw = KeywordSearchStrategy::convert_response(response).expect("should convert");

        assert_eq!(raw.len(), 3);
        assert_eq!(raw[0].latitude, 31.2317);
        assert_eq!(raw[0].longitude, 121.475);
        assert_eq!(raw[1].address, "");
        assert!(raw[2].latitude.is_nan());
        assert!(raw[2].clone().into_poi().is_none());
    }

    #[rstest]
    fn non_success_status_is_a_service_error() {
        let response: PlaceAroundResponse = parse_json(
            r#"{"status": "0", "info": "INVALID_USER_KEY", "infocode": "10001"}"#,
        )
        .expect("should parse");

        let err = KeywordSearchStrategy::convert_response(response).expect_err("should fail");

        assert_eq!(
            err,
            ProviderError::Service {
                code: "10001".to_owned(),
                message: "INVALID_USER_KEY".to_owned(),
            }
        );
    }

    #[rstest]
    #[tokio::test]
    async fn missing_key_is_not_configured(query: SearchQuery) {
        let strategy =
            KeywordSearchStrategy::new(KeywordSearchConfig::default()).expect("strategy builds");

        let err = strategy.fetch(&query).await.expect_err("no key configured");

        assert!(matches!(err, ProviderError::NotConfigured { .. }));
    }
}
