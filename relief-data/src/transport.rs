//! HTTP plumbing shared by the search and routing adapters.

use std::time::Duration;

use reqwest::{Client, Response};
use relief_core::ProviderError;
use serde::de::DeserializeOwned;
use url::Url;

/// Default user agent for outbound requests.
pub const DEFAULT_USER_AGENT: &str = "relief-engine/0.1";

/// Default request timeout in seconds.
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 6;

/// Error type for HTTP adapter construction failures.
#[derive(Debug)]
pub enum ProviderBuildError {
    /// Failed to build the HTTP client.
    HttpClient(reqwest::Error),
    /// The configured base URL could not be parsed.
    BaseUrl {
        /// Rejected value.
        url: String,
        /// Parser error.
        source: url::ParseError,
    },
}

impl std::fmt::Display for ProviderBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HttpClient(err) => write!(f, "failed to build HTTP client: {err}"),
            Self::BaseUrl { url, source } => write!(f, "invalid base URL {url:?}: {source}"),
        }
    }
}

impl std::error::Error for ProviderBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::HttpClient(err) => Some(err),
            Self::BaseUrl { source, .. } => Some(source),
        }
    }
}

pub(crate) fn build_client(
    user_agent: &str,
    timeout: Duration,
) -> Result<Client, ProviderBuildError> {
    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()
        .map_err(ProviderBuildError::HttpClient)
}

/// Parse `base_url`, normalising it to end with a slash so that relative
/// joins extend the path instead of replacing its last segment.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, ProviderBuildError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|source| ProviderBuildError::BaseUrl {
        url: base_url.to_owned(),
        source,
    })
}

/// Join `path` onto `base`, reporting failures as a parse problem.
pub(crate) fn join(base: &Url, path: &str) -> Result<Url, ProviderError> {
    base.join(path).map_err(|err| ProviderError::Parse {
        message: format!("cannot build request URL from {base} and {path:?}: {err}"),
    })
}

/// Convert a reqwest error to a [`ProviderError`].
pub(crate) fn convert_reqwest_error(
    error: &reqwest::Error,
    url: &str,
    timeout: Duration,
) -> ProviderError {
    if error.is_timeout() {
        return ProviderError::Timeout { timeout };
    }

    if let Some(status) = error.status() {
        return ProviderError::Http {
            url: url.to_owned(),
            status: status.as_u16(),
            message: error.to_string(),
        };
    }

    if error.is_decode() {
        return ProviderError::Parse {
            message: error.to_string(),
        };
    }

    ProviderError::Network {
        url: url.to_owned(),
        message: error.to_string(),
    }
}

/// Check the status of `response` and decode its JSON body.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: Result<Response, reqwest::Error>,
    url: &str,
    timeout: Duration,
) -> Result<T, ProviderError> {
    let response = response
        .map_err(|err| convert_reqwest_error(&err, url, timeout))?
        .error_for_status()
        .map_err(|err| convert_reqwest_error(&err, url, timeout))?;
    let body = response
        .text()
        .await
        .map_err(|err| convert_reqwest_error(&err, url, timeout))?;
    parse_json(&body)
}

pub(crate) fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|err| ProviderError::Parse {
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://router.example.com", "http://router.example.com/route/v1/foot")]
    #[case("http://router.example.com/", "http://router.example.com/route/v1/foot")]
    #[case("http://example.com/osrm", "http://example.com/osrm/route/v1/foot")]
    fn joins_keep_base_path(#[case] base: &str, #[case] expected: &str) {
        let base = parse_base_url(base).expect("valid base");
        let url = join(&base, "route/v1/foot").expect("valid join");
        assert_eq!(url.as_str(), expected);
    }

    #[rstest]
    fn rejects_unparseable_base() {
        let err = parse_base_url("not a url").expect_err("should fail");
        assert!(matches!(err, ProviderBuildError::BaseUrl { .. }));
        assert!(err.to_string().contains("not a url"));
    }

    #[rstest]
    fn malformed_json_is_a_parse_error() {
        let result: Result<serde_json::Value, _> = parse_json("{ nope");
        assert!(matches!(result, Err(ProviderError::Parse { .. })));
    }
}
