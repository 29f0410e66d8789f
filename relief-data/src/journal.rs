//! SQLite-backed navigation failure log.

use std::sync::{Mutex, MutexGuard};

use camino::{Utf8Path, Utf8PathBuf};
use relief_core::Coordinate;
use relief_core::journal::{LogError, LogRecord, LogStore, MAX_LOG_ENTRIES};
use rusqlite::{Connection, params};
use thiserror::Error;

use crate::fs::ensure_parent_dir;

/// Errors raised by [`SqliteLogStore`].
#[derive(Debug, Error)]
pub enum SqliteLogError {
    /// The database could not be opened or its schema created.
    #[error("failed to initialise log database at {path}")]
    Initialise {
        /// Database location.
        path: Utf8PathBuf,
        /// Source error from SQLite.
        #[source]
        source: rusqlite::Error,
    },
    /// The parent directory could not be created.
    #[error("failed to create log directory for {path}")]
    CreateDirectory {
        /// Database location.
        path: Utf8PathBuf,
        /// Source error from the filesystem.
        #[source]
        source: std::io::Error,
    },
    /// Writing a record failed.
    #[error("failed to record log entry")]
    Record {
        /// Source error from SQLite.
        #[source]
        source: rusqlite::Error,
    },
    /// Reading records failed.
    #[error("failed to read log entries")]
    Read {
        /// Source error from SQLite.
        #[source]
        source: rusqlite::Error,
    },
    /// A stored row held a timestamp that does not fit the column.
    #[error("timestamp {0} is out of range")]
    TimestampOutOfRange(u64),
    /// A stored row held an invalid coordinate.
    #[error("stored coordinate ({latitude}, {longitude}) is invalid")]
    CorruptCoordinate {
        /// Stored latitude.
        latitude: f64,
        /// Stored longitude.
        longitude: f64,
    },
    /// A previous writer panicked while holding the connection.
    #[error("log database connection is poisoned")]
    Poisoned,
}

impl From<SqliteLogError> for LogError {
    fn from(error: SqliteLogError) -> Self {
        match error {
            SqliteLogError::Poisoned => Self::Poisoned,
            other => Self::Storage {
                message: other.to_string(),
            },
        }
    }
}

/// Persistent [`LogStore`] keeping the newest [`MAX_LOG_ENTRIES`] records.
#[derive(Debug)]
pub struct SqliteLogStore {
    connection: Mutex<Connection>,
    location: Option<Utf8PathBuf>,
}

impl SqliteLogStore {
    /// Open (or create) the log database at `path`.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    /// Returns [`SqliteLogError`] when the directory or database cannot be
    /// prepared.
    pub fn open(path: &Utf8Path) -> Result<Self, SqliteLogError> {
        ensure_parent_dir(path).map_err(|source| SqliteLogError::CreateDirectory {
            path: path.to_path_buf(),
            source,
        })?;
        let connection =
            Connection::open(path).map_err(|source| SqliteLogError::Initialise {
                path: path.to_path_buf(),
                source,
            })?;
        Self::with_connection(connection, Some(path.to_path_buf()))
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    /// Returns [`SqliteLogError`] if SQLite fails to initialise.
    pub fn open_in_memory() -> Result<Self, SqliteLogError> {
        let connection =
            Connection::open_in_memory().map_err(|source| SqliteLogError::Initialise {
                path: Utf8PathBuf::from(":memory:"),
                source,
            })?;
        Self::with_connection(connection, None)
    }

    fn with_connection(
        connection: Connection,
        location: Option<Utf8PathBuf>,
    ) -> Result<Self, SqliteLogError> {
        connection
            .execute(
                "CREATE TABLE IF NOT EXISTS navigation_log (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    recorded_at INTEGER NOT NULL,
                    latitude REAL NOT NULL,
                    longitude REAL NOT NULL,
                    message TEXT NOT NULL
                )",
                [],
            )
            .map_err(|source| SqliteLogError::Initialise {
                path: location
                    .clone()
                    .unwrap_or_else(|| Utf8PathBuf::from(":memory:")),
                source,
            })?;
        Ok(Self {
            connection: Mutex::new(connection),
            location,
        })
    }

    /// Location of the database file, or `None` for in-memory stores.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8Path> {
        self.location.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteLogError> {
        self.connection.lock().map_err(|_| SqliteLogError::Poisoned)
    }

    /// Insert `record` and discard everything but the newest
    /// [`MAX_LOG_ENTRIES`] rows, atomically.
    ///
    /// # Errors
    /// Returns [`SqliteLogError`] if the write fails; the table is left
    /// unchanged in that case.
    pub fn record(&self, record: &LogRecord) -> Result<(), SqliteLogError> {
        let timestamp = i64::try_from(record.timestamp_secs)
            .map_err(|_| SqliteLogError::TimestampOutOfRange(record.timestamp_secs))?;
        let keep = i64::try_from(MAX_LOG_ENTRIES).unwrap_or(i64::MAX);
        let mut connection = self.lock()?;
        let transaction = connection
            .transaction()
            .map_err(|source| SqliteLogError::Record { source })?;
        transaction
            .execute(
                "INSERT INTO navigation_log (recorded_at, latitude, longitude, message)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    timestamp,
                    record.coordinate.latitude(),
                    record.coordinate.longitude(),
                    &record.message
                ],
            )
            .map_err(|source| SqliteLogError::Record { source })?;
        transaction
            .execute(
                "DELETE FROM navigation_log WHERE id NOT IN (
                    SELECT id FROM navigation_log ORDER BY id DESC LIMIT ?1
                )",
                params![keep],
            )
            .map_err(|source| SqliteLogError::Record { source })?;
        transaction
            .commit()
            .map_err(|source| SqliteLogError::Record { source })
    }

    /// Up to `limit` records, newest first.
    ///
    /// # Errors
    /// Returns [`SqliteLogError`] if the query fails or a row is corrupt.
    pub fn recent(&self, limit: usize) -> Result<Vec<LogRecord>, SqliteLogError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let connection = self.lock()?;
        let mut statement = connection
            .prepare(
                "SELECT recorded_at, latitude, longitude, message FROM navigation_log
                 ORDER BY id DESC LIMIT ?1",
            )
            .map_err(|source| SqliteLogError::Read { source })?;
        let rows = statement
            .query_map(params![limit], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(|source| SqliteLogError::Read { source })?;

        let mut records = Vec::new();
        for row in rows {
            let (timestamp, latitude, longitude, message) =
                row.map_err(|source| SqliteLogError::Read { source })?;
            let coordinate = Coordinate::try_new(latitude, longitude).map_err(|_| {
                SqliteLogError::CorruptCoordinate {
                    latitude,
                    longitude,
                }
            })?;
            records.push(LogRecord {
                timestamp_secs: u64::try_from(timestamp).unwrap_or_default(),
                coordinate,
                message,
            });
        }
        Ok(records)
    }

    /// Number of stored records.
    ///
    /// # Errors
    /// Returns [`SqliteLogError`] if the query fails.
    pub fn len(&self) -> Result<usize, SqliteLogError> {
        let connection = self.lock()?;
        let count: i64 = connection
            .query_row("SELECT COUNT(*) FROM navigation_log", [], |row| row.get(0))
            .map_err(|source| SqliteLogError::Read { source })?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Whether the log holds no records.
    ///
    /// # Errors
    /// Returns [`SqliteLogError`] if the query fails.
    pub fn is_empty(&self) -> Result<bool, SqliteLogError> {
        self.len().map(|count| count == 0)
    }
}

impl LogStore for SqliteLogStore {
    fn append_entry(&self, record: LogRecord) -> Result<(), LogError> {
        self.record(&record).map_err(LogError::from)
    }
}
