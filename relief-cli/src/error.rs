//! Error types emitted by the Relief CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use relief_core::CoordinateError;
use relief_core::journey::JourneyError;
use relief_core::route::ParseTravelModeError;
use relief_data::{ProviderBuildError, SettingsError, SqliteLogError};
use thiserror::Error;

/// Errors emitted by the Relief CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The supplied position is not a valid coordinate.
    #[error("invalid position: {0}")]
    InvalidCoordinate(#[from] CoordinateError),
    /// The travel mode could not be parsed.
    #[error(transparent)]
    InvalidMode(#[from] ParseTravelModeError),
    /// Building a remote provider failed.
    #[error("failed to build {provider} provider for {base_url:?}: {source}")]
    BuildProvider {
        provider: &'static str,
        base_url: String,
        #[source]
        source: ProviderBuildError,
    },
    /// Opening the navigation log failed.
    #[error("failed to open navigation log at {path:?}: {source}")]
    OpenLog {
        path: Utf8PathBuf,
        #[source]
        source: SqliteLogError,
    },
    /// Reading the navigation log failed.
    #[error("failed to read navigation log: {0}")]
    ReadLog(#[source] SqliteLogError),
    /// Updating the settings file failed.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// Starting the async runtime failed.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// The journey stopped before producing a report.
    #[error("{}", .0.user_message())]
    Journey(#[from] JourneyError),
    /// Serializing command output failed.
    #[error("failed to serialize output: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
