//! Append-only diagnostics for navigation failures.
//!
//! The dispatcher writes one [`LogRecord`] each time every candidate fails.
//! Stores are bounded: once [`MAX_LOG_ENTRIES`] records exist the oldest
//! are discarded.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use crate::Coordinate;

/// Number of records a store retains.
pub const MAX_LOG_ENTRIES: usize = 200;

/// One diagnostic entry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogRecord {
    /// Seconds since the Unix epoch.
    pub timestamp_secs: u64,
    /// Destination the failed dispatch targeted.
    pub coordinate: Coordinate,
    /// Free-form description.
    pub message: String,
}

impl LogRecord {
    /// Build a record stamped with the current wall-clock time.
    pub fn now(coordinate: Coordinate, message: impl Into<String>) -> Self {
        let timestamp_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs());
        Self {
            timestamp_secs,
            coordinate,
            message: message.into(),
        }
    }
}

/// Errors raised while persisting a [`LogRecord`].
#[derive(Debug, Error)]
pub enum LogError {
    /// The backing store rejected the write.
    #[error("log storage failed: {message}")]
    Storage {
        /// Backend error description.
        message: String,
    },
    /// A previous writer panicked while holding the store.
    #[error("log store is poisoned")]
    Poisoned,
}

/// Destination for diagnostic records.
///
/// Writes are synchronous and may block on I/O. Async callers run them on
/// the blocking pool. Implementations enforce the [`MAX_LOG_ENTRIES`] bound
/// themselves.
pub trait LogStore: Send + Sync {
    /// Persist `record`.
    ///
    /// # Errors
    /// Returns [`LogError`] when the backend cannot store the record.
    fn append_entry(&self, record: LogRecord) -> Result<(), LogError>;
}

/// In-process store, mostly for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryLogStore {
    records: Mutex<VecDeque<LogRecord>>,
}

impl MemoryLogStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the retained records, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .map(|records| records.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl LogStore for MemoryLogStore {
    fn append_entry(&self, record: LogRecord) -> Result<(), LogError> {
        let mut records = self.records.lock().map_err(|_| LogError::Poisoned)?;
        records.push_back(record);
        while records.len() > MAX_LOG_ENTRIES {
            records.pop_front();
        }
        Ok(())
    }
}
