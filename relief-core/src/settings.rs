//! User preferences consulted at dispatch time.

use crate::navigation::MapEngine;

/// Engine used when no preference has been recorded.
pub const DEFAULT_ENGINE: &str = "amap";

/// Read access to persisted user preferences.
pub trait SettingsStore: Send + Sync {
    /// Identifier of the user's preferred navigation app.
    ///
    /// Values are engine identifiers such as `"amap"` or `"google"`.
    /// Unknown identifiers are tolerated by the dispatcher.
    fn preferred_engine(&self) -> String;
}

/// Settings fixed at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticSettings {
    preferred_engine: String,
}

impl StaticSettings {
    /// Settings reporting `preferred_engine`.
    pub fn new(preferred_engine: impl Into<String>) -> Self {
        Self {
            preferred_engine: preferred_engine.into(),
        }
    }

    /// Settings preferring `engine`.
    #[must_use]
    pub fn for_engine(engine: MapEngine) -> Self {
        Self::new(engine.id())
    }
}

impl Default for StaticSettings {
    fn default() -> Self {
        Self::new(DEFAULT_ENGINE)
    }
}

impl SettingsStore for StaticSettings {
    fn preferred_engine(&self) -> String {
        self.preferred_engine.clone()
    }
}
