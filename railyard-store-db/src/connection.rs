// SPDX-FileCopyrightText: 2026 Railyard contributors
// SPDX-License-Identifier: MIT

//! Snapshot-backed connection management.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::backup::Backup;
use rusqlite::{Connection, OpenFlags, OptionalExtension, Params, Row};
use tracing::{debug, error, info};

use crate::error::{Error, PersistError, Result};
use crate::types::TableCounts;

/// Pages copied per backup step when loading or writing a snapshot.
const PAGES_PER_STEP: std::os::raw::c_int = 256;

/// In-memory SQLite database mirrored to a single snapshot file.
///
/// All reads and writes go to the in-memory image. Every mutating helper
/// ([`execute`](Self::execute), [`insert`](Self::insert)) writes the full
/// image back to the snapshot path before returning, so a crash loses at
/// most the statement whose write-back did not complete.
///
/// Each write costs time proportional to the size of the database. The file
/// is not locked: two processes sharing one snapshot overwrite each other's
/// changes.
///
/// The type is `Send` but not `Sync`; share it behind a mutex.
pub struct SnapshotStore {
    pub(crate) conn: Connection,
    path: Option<PathBuf>,
}

impl SnapshotStore {
    /// Open the snapshot at `path`, creating an empty image if the file does
    /// not exist, then apply the schema and additive migrations.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_owned();
        let mut conn = Connection::open_in_memory()?;

        if path.exists() {
            load_snapshot(&path, &mut conn)?;
            info!("Loaded snapshot from {}", path.display());
        } else {
            info!(
                "No snapshot at {}, starting from an empty database",
                path.display()
            );
        }

        let store = Self {
            conn,
            path: Some(path),
        };
        store.configure_pragmas()?;
        let added = store.migrate()?;
        if !added.is_empty() {
            info!("Added columns: {}", added.join(", "));
        }
        Ok(store)
    }

    /// Create a store with no snapshot file (for testing).
    ///
    /// [`persist`](Self::persist) is a no-op for such a store.
    pub fn open_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
            path: None,
        };
        store.configure_pragmas()?;
        store.migrate()?;
        debug!("Created in-memory store");
        Ok(store)
    }

    fn configure_pragmas(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(())
    }

    /// Snapshot file backing this store, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the complete in-memory image to the snapshot file.
    ///
    /// The image is first written to `<path>.tmp` and then renamed over the
    /// snapshot, so the file on disk is always a complete image.
    pub fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        write_snapshot(&self.conn, path).map_err(|source| {
            error!("Failed to persist snapshot to {}: {}", path.display(), source);
            Error::Persistence {
                path: path.clone(),
                source,
            }
        })
    }

    /// Run a mutating statement and persist the result.
    ///
    /// Returns the number of changed rows.
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<usize> {
        let changed = self
            .conn
            .prepare_cached(sql)?
            .execute(params)
            .map_err(Error::from_statement)?;
        self.persist()?;
        Ok(changed)
    }

    /// Run an `INSERT`, persist, and return the new row id.
    pub fn insert<P: Params>(&self, sql: &str, params: P) -> Result<i64> {
        self.conn
            .prepare_cached(sql)?
            .execute(params)
            .map_err(Error::from_statement)?;
        let id = self.conn.last_insert_rowid();
        self.persist()?;
        Ok(id)
    }

    /// Fetch at most one row.
    pub fn query_row_opt<T, P, F>(&self, sql: &str, params: P, f: F) -> Result<Option<T>>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        Ok(self
            .conn
            .prepare_cached(sql)?
            .query_row(params, f)
            .optional()?)
    }

    /// Fetch every row of a query.
    pub fn query_all<T, P, F>(&self, sql: &str, params: P, f: F) -> Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let rows = stmt.query_map(params, f)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Row counts of every table.
    pub fn table_counts(&self) -> Result<TableCounts> {
        Ok(self.conn.query_row(
            r#"
            SELECT
                (SELECT COUNT(*) FROM routes),
                (SELECT COUNT(*) FROM trains),
                (SELECT COUNT(*) FROM route_trains),
                (SELECT COUNT(*) FROM timetables),
                (SELECT COUNT(*) FROM timetable_entries)
            "#,
            [],
            |row| {
                Ok(TableCounts {
                    routes: row.get(0)?,
                    trains: row.get(1)?,
                    route_trains: row.get(2)?,
                    timetables: row.get(3)?,
                    timetable_entries: row.get(4)?,
                })
            },
        )?)
    }

    /// Get raw connection (for advanced usage).
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn load_snapshot(path: &Path, conn: &mut Connection) -> Result<()> {
    let open_err = |source| Error::DatabaseOpen {
        path: path.to_owned(),
        source,
    };
    let source = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(open_err)?;
    let backup = Backup::new(&source, conn).map_err(open_err)?;
    backup
        .run_to_completion(PAGES_PER_STEP, Duration::ZERO, None)
        .map_err(open_err)
}

fn write_snapshot(conn: &Connection, path: &Path) -> std::result::Result<(), PersistError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp = temp_path(path);
    match fs::remove_file(&tmp) {
        Ok(()) => debug!("Removed stale snapshot temp file {}", tmp.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    {
        let mut target = Connection::open(&tmp)?;
        let backup = Backup::new(conn, &mut target)?;
        backup.run_to_completion(PAGES_PER_STEP, Duration::ZERO, None)?;
    }

    fs::rename(&tmp, path)?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_appends_suffix() {
        assert_eq!(
            temp_path(Path::new("/var/lib/railyard.sqlite")),
            PathBuf::from("/var/lib/railyard.sqlite.tmp")
        );
    }

    #[test]
    fn memory_store_persist_is_noop() {
        let store = SnapshotStore::open_memory().unwrap();
        assert!(store.path().is_none());
        store.persist().unwrap();
    }

    #[test]
    fn stale_temp_file_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.sqlite");
        fs::write(temp_path(&path), b"leftover from a crash").unwrap();

        let store = SnapshotStore::open(&path).unwrap();
        store.persist().unwrap();

        assert!(path.exists());
        assert!(!temp_path(&path).exists());
    }
}
