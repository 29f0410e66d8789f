//! Behavioural tests for the SQLite navigation log and JSON settings store.

use std::cell::RefCell;
use std::sync::Arc;

use camino::Utf8PathBuf;
use relief_core::journal::{LogRecord, LogStore};
use relief_core::navigation::{DispatchOutcome, NavigationDispatcher};
use relief_core::settings::SettingsStore;
use relief_core::test_support::ScriptedLauncher;
use relief_core::{Coordinate, PointOfInterest, TravelMode};
use relief_data::{JsonSettingsStore, SqliteLogStore};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

const DESTINATION_ID: &str = "seed-renmin-square-east";

struct World {
    temp: TempDir,
    log: RefCell<Option<Arc<SqliteLogStore>>>,
    launcher: RefCell<Option<Arc<ScriptedLauncher>>>,
    settings: RefCell<Option<JsonSettingsStore>>,
    outcome: RefCell<Option<DispatchOutcome>>,
}

impl World {
    fn path(&self, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.temp.path().join(name)).expect("utf8 temp path")
    }

    fn log(&self) -> Arc<SqliteLogStore> {
        self.log.borrow().clone().expect("log should be opened")
    }

    fn launcher(&self) -> Arc<ScriptedLauncher> {
        self.launcher.borrow().clone().expect("launcher should be set")
    }
}

#[fixture]
fn world() -> World {
    World {
        temp: TempDir::new().expect("create temp dir"),
        log: RefCell::new(None),
        launcher: RefCell::new(None),
        settings: RefCell::new(None),
        outcome: RefCell::new(None),
    }
}

fn destination() -> PointOfInterest {
    let coordinate = Coordinate::try_new(31.2317, 121.4750).expect("valid coordinate");
    PointOfInterest::new(DESTINATION_ID, "People's Square East", "", coordinate)
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("build runtime")
        .block_on(future)
}

fn dispatcher(world: &World) -> NavigationDispatcher {
    let log = world
        .log
        .borrow()
        .clone()
        .unwrap_or_else(|| Arc::new(SqliteLogStore::open_in_memory().expect("open log")));
    NavigationDispatcher::new(world.launcher(), log)
}

fn open_log(world: &World) {
    let store = SqliteLogStore::open(&world.path("state/navigation.sqlite3")).expect("open log");
    *world.log.borrow_mut() = Some(Arc::new(store));
}

// --- Given steps ---

#[given("a navigation log on disk")]
fn log_on_disk(#[from(world)] world: &World) {
    open_log(world);
}

#[given("a launcher that refuses every link")]
fn refusing_launcher(#[from(world)] world: &World) {
    *world.launcher.borrow_mut() = Some(Arc::new(ScriptedLauncher::rejecting_all()));
}

#[given("a launcher that accepts every link")]
fn accepting_launcher(#[from(world)] world: &World) {
    *world.launcher.borrow_mut() = Some(Arc::new(ScriptedLauncher::accepting_all()));
}

#[given("a settings file preferring tencent")]
fn settings_preferring_tencent(#[from(world)] world: &World) {
    let store = JsonSettingsStore::new(world.path("config/settings.json"));
    store
        .set_preferred_engine("tencent")
        .expect("save preference");
    *world.settings.borrow_mut() = Some(store);
}

#[given("no settings file")]
fn no_settings_file(#[from(world)] world: &World) {
    *world.settings.borrow_mut() = Some(JsonSettingsStore::new(world.path("absent.json")));
}

// --- When steps ---

#[when("I navigate to the nearest restroom")]
fn navigate(#[from(world)] world: &World) {
    let outcome = block_on(dispatcher(world).dispatch(&destination(), TravelMode::Walking, "amap"));
    *world.outcome.borrow_mut() = Some(outcome);
}

#[when("I navigate to the nearest restroom using the saved preference")]
fn navigate_with_settings(#[from(world)] world: &World) {
    let settings = world.settings.borrow().clone().expect("settings should be set");
    let outcome = block_on(dispatcher(world).dispatch_with_settings(
        &destination(),
        TravelMode::Walking,
        &settings,
    ));
    *world.outcome.borrow_mut() = Some(outcome);
}

#[when("{count} failures are recorded")]
fn record_failures(#[from(world)] world: &World, count: usize) {
    let log = world.log();
    for index in 0..count {
        log.append_entry(LogRecord::now(
            destination().coordinate,
            format!("failure {index}"),
        ))
        .expect("append entry");
    }
}

#[when("the log is reopened")]
fn reopen(#[from(world)] world: &World) {
    open_log(world);
}

// --- Then steps ---

#[then("the log holds {count} entry")]
fn holds_one(#[from(world)] world: &World, count: usize) {
    assert_eq!(world.log().len().expect("count entries"), count);
}

#[then("the log holds {count} entries")]
fn holds_many(#[from(world)] world: &World, count: usize) {
    assert_eq!(world.log().len().expect("count entries"), count);
}

#[then("the newest entry names the destination")]
fn newest_names_destination(#[from(world)] world: &World) {
    let newest = world.log().recent(1).expect("read entries");
    let message = newest.first().map(|r| r.message.clone()).unwrap_or_default();
    assert!(message.contains(DESTINATION_ID), "unexpected message: {message}");
}

#[then("the newest entry is failure {index}")]
fn newest_is(#[from(world)] world: &World, index: usize) {
    let newest = world.log().recent(1).expect("read entries");
    assert_eq!(
        newest.first().map(|r| r.message.clone()),
        Some(format!("failure {index}"))
    );
}

#[then("the first link opened uses the {scheme} scheme")]
fn first_link_scheme(#[from(world)] world: &World, scheme: String) {
    let outcome = world.outcome.borrow().clone().expect("dispatch should run");
    let uri = outcome.succeeded_uri.expect("dispatch should succeed");
    assert!(uri.starts_with(&format!("{scheme}:")), "unexpected uri: {uri}");
    assert_eq!(world.launcher().invoked().len(), 1);
}

#[then("the preferred engine is {engine}")]
fn preferred_engine_is(#[from(world)] world: &World, engine: String) {
    let settings = world.settings.borrow().clone().expect("settings should be set");
    assert_eq!(settings.preferred_engine(), engine);
}

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/local_storage.feature", name = $title)]
        fn $fn_name(world: World) {
            let _ = world;
        }
    };
}

register_scenario!(
    exhausted_dispatch_logged,
    "an exhausted dispatch is written to the durable log"
);
register_scenario!(
    log_rotates,
    "the log keeps only the newest two hundred entries"
);
register_scenario!(log_survives_restart, "the log survives a restart");
register_scenario!(
    saved_preference_steers,
    "a saved preference steers the dispatcher"
);
register_scenario!(
    missing_settings_default,
    "a missing settings file falls back to the default engine"
);
