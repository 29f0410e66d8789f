//! Desktop implementations of [`LinkLauncher`].

use std::process::{Command, Output};

use async_trait::async_trait;
use log::{debug, info};
use relief_core::navigation::{LaunchError, LinkLauncher, ProbeResult};

/// Schemes `open_link` hands to the system browser or map handler.
const LINK_SCHEMES: [&str; 3] = ["http", "https", "geo"];

fn scheme_of(uri: &str) -> &str {
    uri.split_once(':').map_or(uri, |(scheme, _)| scheme)
}

#[cfg(target_os = "macos")]
fn opener(uri: &str) -> Command {
    let mut command = Command::new("open");
    command.arg(uri);
    command
}

// `cmd /C start` splits the URI at `&`, so bypass the shell.
#[cfg(target_os = "windows")]
fn opener(uri: &str) -> Command {
    let mut command = Command::new("rundll32");
    command.args(["url.dll,FileProtocolHandler", uri]);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn opener(uri: &str) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(uri);
    command
}

async fn run(mut command: Command) -> Result<Output, LaunchError> {
    tokio::task::spawn_blocking(move || command.output())
        .await
        .map_err(|err| LaunchError::Platform {
            message: err.to_string(),
        })?
        .map_err(|err| LaunchError::Platform {
            message: err.to_string(),
        })
}

/// Launcher that hands URIs to the platform opener.
///
/// On Linux, probing asks `xdg-mime` whether a handler is registered for the
/// URI scheme. Other platforms report [`ProbeResult::Unknown`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl SystemLauncher {
    async fn open(uri: &str) -> Result<bool, LaunchError> {
        debug!("opening {uri}");
        let output = run(opener(uri)).await?;
        Ok(output.status.success())
    }
}

#[async_trait]
impl LinkLauncher for SystemLauncher {
    async fn probe(&self, uri: &str) -> ProbeResult {
        if !cfg!(target_os = "linux") {
            return ProbeResult::Unknown;
        }
        let scheme = scheme_of(uri);
        let mut command = Command::new("xdg-mime");
        command
            .args(["query", "default"])
            .arg(format!("x-scheme-handler/{scheme}"));
        match run(command).await {
            Ok(output) if output.status.success() => {
                if String::from_utf8_lossy(&output.stdout).trim().is_empty() {
                    ProbeResult::Unavailable
                } else {
                    ProbeResult::Available
                }
            }
            _ => ProbeResult::Unknown,
        }
    }

    async fn invoke_application(&self, uri: &str) -> Result<(), LaunchError> {
        if Self::open(uri).await? {
            Ok(())
        } else {
            Err(LaunchError::Rejected {
                uri: uri.to_owned(),
            })
        }
    }

    async fn open_link(&self, uri: &str) -> Result<(), LaunchError> {
        if LINK_SCHEMES.contains(&scheme_of(uri)) && Self::open(uri).await? {
            Ok(())
        } else {
            Err(LaunchError::NoHandler {
                uri: uri.to_owned(),
            })
        }
    }
}

/// Launcher that accepts every URI without opening anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunLauncher;

#[async_trait]
impl LinkLauncher for DryRunLauncher {
    async fn invoke_application(&self, uri: &str) -> Result<(), LaunchError> {
        info!("dry run: would open {uri}");
        Ok(())
    }

    async fn open_link(&self, uri: &str) -> Result<(), LaunchError> {
        info!("dry run: would open {uri}");
        Ok(())
    }
}
