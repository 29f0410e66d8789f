//! History and preference commands for the Relief CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use relief_core::journal::LogRecord;
use relief_core::navigation::MapEngine;
use relief_data::{JsonSettingsStore, SqliteLogStore};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_PREFER_ENGINE, CliError, DEFAULT_HISTORY_LIMIT, DEFAULT_LOG_DB, DEFAULT_SETTINGS,
    ENV_PREFER_ENGINE, write_json,
};

/// CLI arguments for the `history` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Show recent navigation failures, newest first")]
#[ortho_config(prefix = "RELIEF")]
pub(crate) struct HistoryArgs {
    /// Path to the SQLite navigation log.
    #[arg(long, value_name = "path")]
    #[serde(default)]
    pub(crate) log_db: Option<Utf8PathBuf>,
    /// Maximum number of entries printed.
    #[arg(long, value_name = "count")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

pub(super) fn run_history_with(args: HistoryArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let path = merged
        .log_db
        .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_LOG_DB));
    let store = SqliteLogStore::open(&path).map_err(|source| CliError::OpenLog {
        path: path.clone(),
        source,
    })?;
    let entries: Vec<LogRecord> = store
        .recent(merged.limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
        .map_err(CliError::ReadLog)?;
    write_json(writer, &entries)
}

/// CLI arguments for the `prefer` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Record the navigation app to try first")]
#[ortho_config(prefix = "RELIEF")]
pub(crate) struct PreferArgs {
    /// Engine identifier such as amap, baidu, tencent, apple or google.
    #[arg(value_name = "engine")]
    #[serde(default)]
    pub(crate) engine: Option<String>,
    /// Path to the JSON settings file.
    #[arg(long, value_name = "path")]
    #[serde(default)]
    pub(crate) settings: Option<Utf8PathBuf>,
}

/// Result of a `prefer` invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct PreferenceUpdate {
    pub(crate) preferred_engine: String,
    /// Whether the identifier names a built-in engine.
    pub(crate) recognised: bool,
    pub(crate) settings: Utf8PathBuf,
}

pub(super) fn run_prefer_with(args: PreferArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let engine = merged.engine.ok_or(CliError::MissingArgument {
        field: ARG_PREFER_ENGINE,
        env: ENV_PREFER_ENGINE,
    })?;
    let path = merged
        .settings
        .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_SETTINGS));
    let known = MapEngine::from_id(&engine);
    let recognised = known.is_some();
    let preferred_engine = known.map_or(engine, |known| known.id().to_owned());
    JsonSettingsStore::new(path.clone()).set_preferred_engine(&preferred_engine)?;
    write_json(
        writer,
        &PreferenceUpdate {
            preferred_engine,
            recognised,
            settings: path,
        },
    )
}
