//! Hand-off to external navigation apps.
//!
//! [`build_candidates`] turns a destination into an ordered list of deep
//! links and [`NavigationDispatcher`] opens the first one the platform
//! accepts through a [`LinkLauncher`].

mod dispatcher;
mod launcher;
mod links;
mod outcome;

pub use dispatcher::{DispatchState, NavigationDispatcher};
pub use launcher::{LaunchError, LinkLauncher, ProbeResult};
pub use links::{GENERIC_ENGINE, MapEngine, WEB_ENGINE, build_candidates};
pub use outcome::{DispatchOutcome, FailedAttempt, LinkCandidate};
