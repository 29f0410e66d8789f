//! Adapters connecting the Relief engine to the outside world.
//!
//! Responsibilities:
//! - Remote search strategies over HTTP ([`search`]).
//! - Live routing against an OSRM server ([`routing`]).
//! - Persistent navigation log and user preferences on disk.
//!
//! Boundaries:
//! - Do not encode domain rules (live in `relief-core`).
//! - Remote adapters never apply their own fallback; the core engines
//!   decide what a failure means.

#![forbid(unsafe_code)]

mod fs;
mod journal;
pub mod routing;
pub mod search;
mod settings;
mod transport;

pub use journal::{SqliteLogError, SqliteLogStore};
pub use settings::{JsonSettingsStore, Preferences, SettingsError};
pub use transport::{DEFAULT_USER_AGENT, ProviderBuildError};
