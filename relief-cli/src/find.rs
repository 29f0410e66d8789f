//! Find command implementation for the Relief CLI.

use std::io::Write;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::Parser;
use log::warn;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use relief_core::journey::{
    DEFAULT_RADIUS_METERS, DEFAULT_RESULT_LIMIT, Journey, JourneyOutcome, JourneyReport,
    JourneyRequest, LocationStatus,
};
use relief_core::navigation::{LinkLauncher, NavigationDispatcher};
use relief_core::settings::{SettingsStore, StaticSettings};
use relief_core::{
    Coordinate, EstimatorConfig, ReachabilityFilter, RouteEstimator, SearchStrategy,
    SeedSearchStrategy, TravelMode,
};
use relief_data::routing::HttpRoutingService;
use relief_data::search::{
    KeywordSearchConfig, KeywordSearchStrategy, OverpassSearchConfig, OverpassSearchStrategy,
};
use relief_data::{JsonSettingsStore, SqliteLogStore};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::launcher::{DryRunLauncher, SystemLauncher};
use crate::{
    ARG_FIND_LAT, ARG_FIND_LON, ARG_FIND_MODE, CliError, DEFAULT_LOG_DB, DEFAULT_SETTINGS,
    ENV_FIND_LAT, ENV_FIND_LON, write_json,
};

/// CLI arguments for the `find` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Search for the nearest public restroom around a position, \
                 check it can be reached within an optional time budget and \
                 open it in a navigation app. Prints a JSON report of every \
                 stage.",
    about = "Find the nearest restroom and start navigation"
)]
#[ortho_config(prefix = "RELIEF")]
pub(crate) struct FindArgs {
    /// Latitude of the current position in degrees.
    #[arg(long = ARG_FIND_LAT, value_name = "degrees", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Longitude of the current position in degrees.
    #[arg(long = ARG_FIND_LON, value_name = "degrees", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) lon: Option<f64>,
    /// Search radius in metres.
    #[arg(long, value_name = "metres")]
    #[serde(default)]
    pub(crate) radius: Option<f64>,
    /// Maximum number of candidates considered.
    #[arg(long, value_name = "count")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
    /// Travel mode: walking or cycling.
    #[arg(long = ARG_FIND_MODE, value_name = "mode")]
    #[serde(default)]
    pub(crate) mode: Option<String>,
    /// Time budget in minutes; unreachable restrooms are skipped.
    #[arg(long, value_name = "minutes")]
    #[serde(default)]
    pub(crate) time_limit: Option<f64>,
    /// Navigation app to try first, overriding the settings file.
    #[arg(long, value_name = "engine")]
    #[serde(default)]
    pub(crate) engine: Option<String>,
    /// API key enabling the keyword search provider.
    #[arg(long, value_name = "key")]
    #[serde(default)]
    pub(crate) amap_key: Option<String>,
    /// Overpass interpreter URL enabling the open-data provider.
    #[arg(long, value_name = "url")]
    #[serde(default)]
    pub(crate) overpass_url: Option<String>,
    /// OSRM base URL enabling live trip estimates.
    #[arg(long, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// Path to the SQLite navigation log.
    #[arg(long, value_name = "path")]
    #[serde(default)]
    pub(crate) log_db: Option<Utf8PathBuf>,
    /// Path to the JSON settings file.
    #[arg(long, value_name = "path")]
    #[serde(default)]
    pub(crate) settings: Option<Utf8PathBuf>,
    /// Report the chosen link without opening it.
    #[arg(long)]
    #[serde(default)]
    pub(crate) dry_run: bool,
}

impl FindArgs {
    pub(crate) fn into_config(self) -> Result<FindConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        FindConfig::try_from(merged)
    }
}

/// Resolved `find` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FindConfig {
    /// Current position.
    pub(crate) origin: Coordinate,
    /// Journey parameters.
    pub(crate) request: JourneyRequest,
    /// Engine override; `None` defers to the settings file.
    pub(crate) engine: Option<String>,
    pub(crate) amap_key: Option<String>,
    pub(crate) overpass_url: Option<String>,
    pub(crate) osrm_base_url: Option<String>,
    pub(crate) log_db: Utf8PathBuf,
    pub(crate) settings: Utf8PathBuf,
    pub(crate) dry_run: bool,
}

impl TryFrom<FindArgs> for FindConfig {
    type Error = CliError;

    fn try_from(args: FindArgs) -> Result<Self, Self::Error> {
        let lat = args.lat.ok_or(CliError::MissingArgument {
            field: ARG_FIND_LAT,
            env: ENV_FIND_LAT,
        })?;
        let lon = args.lon.ok_or(CliError::MissingArgument {
            field: ARG_FIND_LON,
            env: ENV_FIND_LON,
        })?;
        let origin = Coordinate::try_new(lat, lon)?;
        let mode = args
            .mode
            .as_deref()
            .map(str::parse::<TravelMode>)
            .transpose()?
            .unwrap_or_default();
        let request = JourneyRequest {
            radius_meters: args.radius.unwrap_or(DEFAULT_RADIUS_METERS),
            result_limit: args.limit.unwrap_or(DEFAULT_RESULT_LIMIT),
            mode,
            time_limit_minutes: args.time_limit,
        };
        Ok(Self {
            origin,
            request,
            engine: args.engine,
            amap_key: args.amap_key,
            overpass_url: args.overpass_url,
            osrm_base_url: args.osrm_base_url,
            log_db: args.log_db.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_LOG_DB)),
            settings: args
                .settings
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_SETTINGS)),
            dry_run: args.dry_run,
        })
    }
}

/// Builds a journey for the current find invocation.
pub(super) trait JourneyBuilder {
    fn build(&self, config: &FindConfig) -> Result<Journey, CliError>;
}

pub(super) struct DefaultJourneyBuilder;

impl DefaultJourneyBuilder {
    pub(crate) fn strategies(
        config: &FindConfig,
    ) -> Result<Vec<Box<dyn SearchStrategy>>, CliError> {
        let mut strategies: Vec<Box<dyn SearchStrategy>> = Vec::new();
        if let Some(key) = &config.amap_key {
            let provider_config = KeywordSearchConfig::new(key.clone());
            let base_url = provider_config.base_url.clone();
            let strategy = KeywordSearchStrategy::new(provider_config).map_err(|source| {
                CliError::BuildProvider {
                    provider: "keyword",
                    base_url,
                    source,
                }
            })?;
            strategies.push(Box::new(strategy));
        }
        if let Some(url) = &config.overpass_url {
            let strategy = OverpassSearchStrategy::new(OverpassSearchConfig::new(url.clone()))
                .map_err(|source| CliError::BuildProvider {
                    provider: "overpass",
                    base_url: url.clone(),
                    source,
                })?;
            strategies.push(Box::new(strategy));
        }
        strategies.push(Box::new(SeedSearchStrategy::builtin()));
        Ok(strategies)
    }

    fn filter(config: &FindConfig) -> Result<ReachabilityFilter, CliError> {
        let Some(url) = &config.osrm_base_url else {
            return Ok(ReachabilityFilter::default());
        };
        let service =
            HttpRoutingService::new(url.clone()).map_err(|source| CliError::BuildProvider {
                provider: "routing",
                base_url: url.clone(),
                source,
            })?;
        Ok(ReachabilityFilter::new(RouteEstimator::with_service(
            Arc::new(service),
            EstimatorConfig::default(),
        )))
    }
}

impl JourneyBuilder for DefaultJourneyBuilder {
    fn build(&self, config: &FindConfig) -> Result<Journey, CliError> {
        let log = SqliteLogStore::open(&config.log_db).map_err(|source| CliError::OpenLog {
            path: config.log_db.clone(),
            source,
        })?;
        let launcher: Arc<dyn LinkLauncher> = if config.dry_run {
            Arc::new(DryRunLauncher)
        } else {
            Arc::new(SystemLauncher)
        };
        let settings: Arc<dyn SettingsStore> = match &config.engine {
            Some(engine) => Arc::new(StaticSettings::new(engine.clone())),
            None => Arc::new(JsonSettingsStore::new(config.settings.clone())),
        };
        let dispatcher = NavigationDispatcher::new(launcher, Arc::new(log));
        Ok(Journey::new(Self::strategies(config)?, dispatcher, settings)
            .with_filter(Self::filter(config)?))
    }
}

pub(super) fn run_find(args: FindArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_find_with(args, &DefaultJourneyBuilder, &mut stdout)
}

pub(super) fn run_find_with(
    args: FindArgs,
    builder: &dyn JourneyBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let report = execute_find(args, builder)?;
    write_json(writer, &report)?;
    if !matches!(report.outcome, JourneyOutcome::Dispatched { .. }) {
        warn!("{}", report.outcome.user_message());
    }
    Ok(())
}

fn execute_find(args: FindArgs, builder: &dyn JourneyBuilder) -> Result<JourneyReport, CliError> {
    let config = args.into_config()?;
    let journey = builder.build(&config)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let location = LocationStatus::Available(config.origin);
    let report = runtime.block_on(journey.run(
        location,
        &config.request,
        &CancellationToken::new(),
    ))?;
    Ok(report)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<FindConfig, CliError> {
    let merged = FindArgs::merge_from_layers(layers).map_err(CliError::from)?;
    FindConfig::try_from(merged)
}
