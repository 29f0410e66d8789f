//! Test helpers shared by the CLI unit and behaviour tests.

use std::sync::Arc;

use camino::Utf8PathBuf;
use relief_core::journal::MemoryLogStore;
use relief_core::journey::Journey;
use relief_core::navigation::NavigationDispatcher;
use relief_core::settings::StaticSettings;
use relief_core::test_support::ScriptedLauncher;
use relief_core::{SearchStrategy, SeedSearchStrategy};
use tempfile::TempDir;

use super::*;
use crate::find::{FindConfig, JourneyBuilder};

/// Temporary directory exposed as a UTF-8 path.
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }
}

/// Journey builder using the bundled seed data and an accepting launcher.
pub(super) struct SeedJourneyBuilder;

impl JourneyBuilder for SeedJourneyBuilder {
    fn build(&self, config: &FindConfig) -> Result<Journey, CliError> {
        let dispatcher = NavigationDispatcher::new(
            Arc::new(ScriptedLauncher::accepting_all()),
            Arc::new(MemoryLogStore::new()),
        );
        let settings = config
            .engine
            .clone()
            .map_or_else(StaticSettings::default, StaticSettings::new);
        let strategies: Vec<Box<dyn SearchStrategy>> = vec![Box::new(SeedSearchStrategy::builtin())];
        Ok(Journey::new(strategies, dispatcher, Arc::new(settings)))
    }
}

/// Render captured stdout as JSON.
pub(super) fn stdout_json(buffer: &[u8]) -> serde_json::Value {
    let text = String::from_utf8(buffer.to_vec()).expect("stdout utf-8");
    serde_json::from_str(&text).expect("output should be JSON")
}
