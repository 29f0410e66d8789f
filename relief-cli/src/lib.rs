//! Command-line interface for the Relief restroom finder.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::{Parser, Subcommand};
use serde::Serialize;

mod error;
mod find;
mod history;
mod launcher;

pub use error::CliError;
pub use launcher::{DryRunLauncher, SystemLauncher};

use find::{FindArgs, run_find};
use history::{HistoryArgs, PreferArgs, run_history_with, run_prefer_with};

pub(crate) const ARG_FIND_LAT: &str = "lat";
pub(crate) const ARG_FIND_LON: &str = "lon";
pub(crate) const ARG_FIND_MODE: &str = "mode";
pub(crate) const ARG_PREFER_ENGINE: &str = "engine";
pub(crate) const ENV_FIND_LAT: &str = "RELIEF_CMDS_FIND_LAT";
pub(crate) const ENV_FIND_LON: &str = "RELIEF_CMDS_FIND_LON";
pub(crate) const ENV_PREFER_ENGINE: &str = "RELIEF_CMDS_PREFER_ENGINE";

/// Default location of the navigation log.
pub(crate) const DEFAULT_LOG_DB: &str = ".relief/navigation.sqlite3";
/// Default location of the settings file.
pub(crate) const DEFAULT_SETTINGS: &str = ".relief/settings.json";
pub(crate) const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Run the Relief CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when argument parsing, configuration merging or the
/// selected command fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Find(args) => run_find(args),
        Command::History(args) => run_history_with(args, &mut std::io::stdout().lock()),
        Command::Prefer(args) => run_prefer_with(args, &mut std::io::stdout().lock()),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "relief",
    about = "Find the nearest public restroom and navigate to it",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search nearby, filter by travel time and open a navigation app.
    Find(FindArgs),
    /// Print recent navigation failures from the log.
    History(HistoryArgs),
    /// Save the preferred navigation app.
    Prefer(PreferArgs),
}

pub(crate) fn write_json<T: Serialize + ?Sized>(
    writer: &mut dyn Write,
    value: &T,
) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerializeOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
