//! Shared test harness modules for the Relief CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;

mod find_steps;
mod helpers;
