mod cities;
mod migration_ops;
mod records;
mod tables;

use std::path::{Path, PathBuf};
use std::{fmt, io};

use newsfeed_core::geo::CoordinatesError;
use newsfeed_core::{Fingerprint, RecordKind};
use redb_bincode::{ReadTransaction, WriteTransaction};
use snafu::{Location, ResultExt as _, Snafu};
use tracing::debug;

pub use self::cities::{CityStats, DEFAULT_CITIES};
pub use self::records::{InsertedRow, RecordCounts, StoredRow};
pub use self::tables::*;

const LOG_TARGET: &str = "newsfeed::db";

pub const DB_FILE_NAME: &str = "newsfeed.redb";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DbError {
    Database {
        source: redb::DatabaseError,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(transparent)]
    Table {
        source: redb::TableError,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(transparent)]
    Storage {
        source: redb::StorageError,
        #[snafu(implicit)]
        location: Location,
    },
    Transaction {
        source: redb::TransactionError,
        #[snafu(implicit)]
        location: Location,
    },
    Commit {
        source: redb::CommitError,
        #[snafu(implicit)]
        location: Location,
    },
    DbVersionTooHigh {
        db_ver: u64,
        code_ver: u64,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("{kind} record with fingerprint {fingerprint} already stored"))]
    DuplicateFingerprint {
        kind: RecordKind,
        fingerprint: Fingerprint,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("City name must not be empty"))]
    EmptyCityName {
        #[snafu(implicit)]
        location: Location,
    },
    InvalidCoordinates {
        source: CoordinatesError,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("Failed to stat database file {}", path.display()))]
    Metadata {
        source: io::Error,
        path: PathBuf,
        #[snafu(implicit)]
        location: Location,
    },
}

impl DbError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, DbError::DuplicateFingerprint { .. })
    }
}

pub type DbResult<T> = std::result::Result<T, DbError>;

/// Handle to the on-disk store.
///
/// Holds only the path: every operation opens the file, runs one
/// transaction and closes it again, so no lock is kept between calls.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseInfo {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub counts: RecordCounts,
}

impl DatabaseInfo {
    pub fn total(&self) -> u64 {
        self.counts.total()
    }
}

impl fmt::Display for DatabaseInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Database: {}", self.path.display())?;
        writeln!(f, "Size: {} bytes", self.size_bytes)?;
        for kind in RecordKind::ALL {
            writeln!(f, "{}: {}", kind, self.counts.get(kind))?;
        }
        write!(f, "Total: {}", self.total())
    }
}

impl Database {
    pub fn mk_db_path(data_dir: &Path) -> std::result::Result<PathBuf, io::Error> {
        std::fs::create_dir_all(data_dir)?;
        Ok(data_dir.join(DB_FILE_NAME))
    }

    /// Create the file if needed, make sure every table exists and check the
    /// schema version.
    pub fn open(path: impl Into<PathBuf>) -> DbResult<Database> {
        let path = path.into();
        debug!(target: LOG_TARGET, path = %path.display(), "Opening database");

        let s = Self { path };
        s.write_with(|tx| {
            Self::init_tables_tx(tx)?;
            Self::handle_db_ver_migrations(tx)?;
            Ok(())
        })?;

        Ok(s)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> DbResult<redb_bincode::Database> {
        redb_bincode::Database::create(&self.path).context(DatabaseSnafu)
    }

    pub fn write_with<T>(
        &self,
        f: impl FnOnce(&'_ WriteTransaction) -> DbResult<T>,
    ) -> DbResult<T> {
        let inner = self.connect()?;
        let dbtx = inner.begin_write().context(TransactionSnafu)?;
        let res = f(&dbtx)?;

        dbtx.commit().context(CommitSnafu)?;

        Ok(res)
    }

    pub fn read_with<T>(&self, f: impl FnOnce(&'_ ReadTransaction) -> DbResult<T>) -> DbResult<T> {
        let inner = self.connect()?;
        let dbtx = inner.begin_read().context(TransactionSnafu)?;

        f(&dbtx)
    }

    pub fn info(&self) -> DbResult<DatabaseInfo> {
        let counts = self.counts()?;
        let size_bytes = std::fs::metadata(&self.path)
            .context(MetadataSnafu {
                path: self.path.clone(),
            })?
            .len();
        Ok(DatabaseInfo {
            path: self.path.clone(),
            size_bytes,
            counts,
        })
    }
}

#[cfg(test)]
mod tests;
