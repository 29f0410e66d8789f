//! Platform seam for opening deep links.

use async_trait::async_trait;
use thiserror::Error;

/// Answer to "can this URI be opened here?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbeResult {
    /// A handler is installed.
    Available,
    /// No handler is installed; the candidate is skipped.
    Unavailable,
    /// The platform cannot tell; launching is attempted anyway.
    #[default]
    Unknown,
}

/// Failure to open a URI through one launch path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchError {
    /// The platform refused the URI.
    #[error("platform rejected {uri}")]
    Rejected {
        /// URI that was refused.
        uri: String,
    },
    /// No application handles the URI scheme.
    #[error("no handler registered for {uri}")]
    NoHandler {
        /// URI without a handler.
        uri: String,
    },
    /// The launch mechanism itself failed.
    #[error("launch failed: {message}")]
    Platform {
        /// Platform error description.
        message: String,
    },
}

/// Opens URIs on behalf of the [`NavigationDispatcher`](super::NavigationDispatcher).
///
/// Two launch paths exist because platforms commonly expose both a direct
/// "start this app" call and a generic "open this link" call, and either
/// may succeed where the other fails.
#[async_trait]
pub trait LinkLauncher: Send + Sync {
    /// Ask whether a handler for `uri` is installed.
    ///
    /// Platforms without a query mechanism keep the default.
    async fn probe(&self, _uri: &str) -> ProbeResult {
        ProbeResult::Unknown
    }

    /// Start the application registered for `uri`.
    async fn invoke_application(&self, uri: &str) -> Result<(), LaunchError>;

    /// Open `uri` through the generic link handler.
    async fn open_link(&self, uri: &str) -> Result<(), LaunchError>;
}
