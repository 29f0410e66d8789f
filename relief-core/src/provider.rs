//! Failure taxonomy shared by remote search and routing providers.
//!
//! Every adapter maps its transport and payload failures onto
//! [`ProviderError`]. The aggregator and estimator swallow these at their
//! boundaries, so the variants exist for logging and test assertions rather
//! than for user-facing messages.

use std::time::Duration;

use thiserror::Error;

/// Errors raised by a single provider call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The call did not complete within its time allowance.
    #[error("provider call timed out after {}ms", timeout.as_millis())]
    Timeout {
        /// Allowance that elapsed.
        timeout: Duration,
    },
    /// The provider answered with a non-success HTTP status.
    #[error("request to {url} failed with status {status}: {message}")]
    Http {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error text reported by the transport.
        message: String,
    },
    /// The request could not be delivered.
    #[error("network error contacting {url}: {message}")]
    Network {
        /// Request URL.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The response body was not in the expected shape.
    #[error("failed to parse provider response: {message}")]
    Parse {
        /// Parser error description.
        message: String,
    },
    /// The provider reported an application-level failure.
    #[error("provider reported {code}: {message}")]
    Service {
        /// Provider status code.
        code: String,
        /// Provider message, possibly empty.
        message: String,
    },
    /// The provider lacks the configuration it needs to run.
    #[error("provider is not configured: {what}")]
    NotConfigured {
        /// Missing configuration item.
        what: String,
    },
}

impl ProviderError {
    /// Whether the failure was a timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Run `future` against `timeout`, mapping expiry to [`ProviderError::Timeout`].
pub(crate) async fn with_timeout<T, F>(timeout: Duration, future: F) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    tokio::time::timeout(timeout, future)
        .await
        .unwrap_or(Err(ProviderError::Timeout { timeout }))
}
