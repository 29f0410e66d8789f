//! Behaviour-driven step definitions driving the find CLI scenarios.

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

use super::helpers::{SeedJourneyBuilder, stdout_json};
use super::*;
use crate::find::run_find_with;

#[derive(Debug, Default)]
struct FindWorld {
    position: RefCell<Option<(String, String)>>,
    include_lat: RefCell<bool>,
    cli_args: RefCell<Vec<String>>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl FindWorld {
    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec!["relief".to_owned(), "find".to_owned()];
        if let Some((lat, lon)) = self.position.borrow().clone() {
            if *self.include_lat.borrow() {
                argv.extend([format!("--{ARG_FIND_LAT}"), lat]);
            }
            argv.extend([format!("--{ARG_FIND_LON}"), lon]);
        }
        argv.extend(self.cli_args.borrow().iter().cloned());
        argv
    }

    fn error(&self) -> String {
        let borrowed = self.result.borrow();
        match borrowed.as_ref().expect("result recorded") {
            Ok(()) => panic!("expected failure"),
            Err(err) => format!("{err:?}"),
        }
    }
}

#[fixture]
fn world() -> FindWorld {
    let world = FindWorld::default();
    *world.include_lat.borrow_mut() = true;
    world
}

fn set_position(world: &FindWorld, lat: &str, lon: &str) {
    *world.position.borrow_mut() = Some((lat.to_owned(), lon.to_owned()));
}

#[given("a position at People's Square")]
fn position_at_square(#[from(world)] world: &FindWorld) {
    set_position(world, "31.2304", "121.4737");
}

#[given("a position in the middle of the ocean")]
fn position_in_ocean(#[from(world)] world: &FindWorld) {
    set_position(world, "-30.0", "-140.0");
}

#[given("I omit the latitude")]
fn omit_latitude(#[from(world)] world: &FindWorld) {
    set_position(world, "31.2304", "121.4737");
    *world.include_lat.borrow_mut() = false;
}

#[given("I prefer the {engine} engine")]
fn prefer_engine(#[from(world)] world: &FindWorld, engine: String) {
    world
        .cli_args
        .borrow_mut()
        .extend(["--engine".to_owned(), engine]);
}

#[given("a time limit of {minutes} minutes")]
fn time_limit(#[from(world)] world: &FindWorld, minutes: String) {
    world
        .cli_args
        .borrow_mut()
        .extend(["--time-limit".to_owned(), minutes]);
}

#[given("the travel mode {mode}")]
fn travel_mode(#[from(world)] world: &FindWorld, mode: String) {
    world
        .cli_args
        .borrow_mut()
        .extend([format!("--{ARG_FIND_MODE}"), mode]);
}

#[when("I run the find command")]
fn run_find_command(#[from(world)] world: &FindWorld) {
    let invocation = world.build_command_line();
    let parsed = Cli::try_parse_from(invocation).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Find(args) => {
            let mut buffer = world.stdout.borrow_mut();
            run_find_with(args, &SeedJourneyBuilder, &mut *buffer)
        }
        other => panic!("expected find command, found {other:?}"),
    });
    world.result.replace(Some(outcome));
}

fn assert_success_with_status(world: &FindWorld, status: &str) {
    let borrowed = world.result.borrow();
    let result = borrowed.as_ref().expect("result recorded");
    result.as_ref().expect("expected success");

    let report = stdout_json(&world.stdout.borrow());
    assert_eq!(report["outcome"]["status"], status);
}

#[then("the command succeeds and navigation starts")]
fn command_dispatches(#[from(world)] world: &FindWorld) {
    assert_success_with_status(world, "dispatched");
}

#[then("the command succeeds with status {status}")]
fn command_succeeds_with_status(#[from(world)] world: &FindWorld, status: String) {
    assert_success_with_status(world, &status);
}

#[then("the destination is {id}")]
fn destination_is(#[from(world)] world: &FindWorld, id: String) {
    let report = stdout_json(&world.stdout.borrow());
    assert_eq!(report["destination"]["id"], id.as_str());
}

#[then("the opened link uses the {scheme} scheme")]
fn opened_link_scheme(#[from(world)] world: &FindWorld, scheme: String) {
    let report = stdout_json(&world.stdout.borrow());
    let uri = report["outcome"]["uri"].as_str().expect("dispatched uri");
    assert!(uri.starts_with(&format!("{scheme}:")), "unexpected uri {uri}");
}

#[then("the command fails because lat is missing")]
fn command_fails_missing_lat(#[from(world)] world: &FindWorld) {
    let borrowed = world.result.borrow();
    let error = borrowed
        .as_ref()
        .expect("result recorded")
        .as_ref()
        .expect_err("expected error");
    match error {
        CliError::MissingArgument { field, .. } => assert_eq!(*field, ARG_FIND_LAT),
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[then("the command fails because the travel mode is invalid")]
fn command_fails_invalid_mode(#[from(world)] world: &FindWorld) {
    let error = world.error();
    assert!(error.starts_with("InvalidMode"), "unexpected error {error}");
}

macro_rules! register_find_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/find_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: FindWorld) {
            let _ = world;
        }
    };
}

register_find_scenario!(find_happy_path, "finding a restroom near People's Square");
register_find_scenario!(find_preferred_engine, "preferring an engine on the command line");
register_find_scenario!(find_zero_budget, "a zero minute budget reaches nothing");
register_find_scenario!(find_nothing_nearby, "nothing nearby");
register_find_scenario!(find_missing_lat, "rejecting a missing latitude");
register_find_scenario!(find_unknown_mode, "rejecting an unknown travel mode");
