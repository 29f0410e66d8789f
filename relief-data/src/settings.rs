//! JSON-file preferences store.

use std::io::{self, Read, Write};

use camino::{Utf8Path, Utf8PathBuf};
use log::warn;
use relief_core::settings::{DEFAULT_ENGINE, SettingsStore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fs::{ensure_parent_dir, open_dir_and_file};

/// Errors raised while reading or writing the settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The file could not be read.
    #[error("failed to read settings from {path}")]
    Read {
        /// Settings location.
        path: Utf8PathBuf,
        /// Source error from the filesystem.
        #[source]
        source: io::Error,
    },
    /// The file could not be written.
    #[error("failed to write settings to {path}")]
    Write {
        /// Settings location.
        path: Utf8PathBuf,
        /// Source error from the filesystem.
        #[source]
        source: io::Error,
    },
    /// The file did not hold valid settings JSON.
    #[error("settings file {path} is malformed")]
    Parse {
        /// Settings location.
        path: Utf8PathBuf,
        /// Source error from `serde_json`.
        #[source]
        source: serde_json::Error,
    },
}

/// Persisted user preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Identifier of the preferred navigation app.
    pub preferred_engine: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            preferred_engine: DEFAULT_ENGINE.to_owned(),
        }
    }
}

/// [`SettingsStore`] reading a small JSON document from disk.
///
/// The file is read on every lookup so edits by other processes are seen
/// without a restart. A missing file yields the defaults.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: Utf8PathBuf,
}

impl JsonSettingsStore {
    /// Store backed by the file at `path`.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the settings file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Load the preferences, falling back to defaults when the file is absent.
    ///
    /// # Errors
    /// Returns [`SettingsError`] if the file exists but cannot be read or
    /// parsed.
    pub fn load(&self) -> Result<Preferences, SettingsError> {
        let read_error = |source| SettingsError::Read {
            path: self.path.clone(),
            source,
        };
        let (dir, name) = match open_dir_and_file(&self.path) {
            Ok(found) => found,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(Preferences::default());
            }
            Err(err) => return Err(read_error(err)),
        };
        let mut file = match dir.open(&name) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(Preferences::default());
            }
            Err(err) => return Err(read_error(err)),
        };
        let mut body = String::new();
        file.read_to_string(&mut body).map_err(read_error)?;
        serde_json::from_str(&body).map_err(|source| SettingsError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Write `preferences`, creating parent directories as needed.
    ///
    /// # Errors
    /// Returns [`SettingsError`] if the file cannot be written.
    pub fn save(&self, preferences: &Preferences) -> Result<(), SettingsError> {
        let write_error = |source| SettingsError::Write {
            path: self.path.clone(),
            source,
        };
        ensure_parent_dir(&self.path).map_err(write_error)?;
        let (dir, name) = open_dir_and_file(&self.path).map_err(write_error)?;
        let body = serde_json::to_string_pretty(preferences)
            .map_err(|err| write_error(io::Error::other(err)))?;
        let mut file = dir.create(&name).map_err(write_error)?;
        file.write_all(body.as_bytes()).map_err(write_error)?;
        file.write_all(b"\n").map_err(write_error)
    }

    /// Record `engine` as the preferred navigation app.
    ///
    /// # Errors
    /// Returns [`SettingsError`] if the existing file is unreadable or the
    /// update cannot be written.
    pub fn set_preferred_engine(&self, engine: &str) -> Result<(), SettingsError> {
        let mut preferences = self.load()?;
        engine.clone_into(&mut preferences.preferred_engine);
        self.save(&preferences)
    }
}

impl SettingsStore for JsonSettingsStore {
    fn preferred_engine(&self) -> String {
        match self.load() {
            Ok(preferences) => preferences.preferred_engine,
            Err(err) => {
                warn!("using default engine {DEFAULT_ENGINE}: {err}");
                DEFAULT_ENGINE.to_owned()
            }
        }
    }
}
