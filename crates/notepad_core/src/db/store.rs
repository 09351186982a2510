//! Lazily opened, shared connection to the notes database.
//!
//! # Invariants
//! - The connection is opened at most once successfully per store; later
//!   calls reuse it.
//! - A failed open leaves the store unopened and reports the error to the
//!   requesting operation.
//! - Access to the connection is serialized by one mutex.

use super::{open_db, open_db_in_memory, DbError, DbResult, OpenMode};
use once_cell::sync::OnceCell;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Where the store keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    Memory,
}

/// Shared handle to the notes database, opened on first use.
#[derive(Debug)]
pub struct NoteStore {
    location: StoreLocation,
    mode: OpenMode,
    conn: OnceCell<Mutex<Connection>>,
}

impl NoteStore {
    pub fn new(location: StoreLocation, mode: OpenMode) -> Self {
        Self {
            location,
            mode,
            conn: OnceCell::new(),
        }
    }

    /// Read-write store backed by a database file.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(StoreLocation::File(path.into()), OpenMode::ReadWrite)
    }

    /// Read-only store backed by a database file.
    pub fn file_read_only(path: impl Into<PathBuf>) -> Self {
        Self::new(StoreLocation::File(path.into()), OpenMode::ReadOnly)
    }

    /// Private in-memory store; data lives as long as the store.
    pub fn in_memory() -> Self {
        Self::new(StoreLocation::Memory, OpenMode::ReadWrite)
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            StoreLocation::File(path) => Some(path.as_path()),
            StoreLocation::Memory => None,
        }
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Returns whether the connection has been opened.
    pub fn is_open(&self) -> bool {
        self.conn.get().is_some()
    }

    /// Opens the connection now if it is not open yet.
    pub fn ensure_open(&self) -> DbResult<()> {
        self.connection().map(|_| ())
    }

    /// Runs `f` with exclusive access to the shared connection.
    pub fn with_connection<T, E>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<DbError>,
    {
        let conn = self.connection()?;
        let mut guard = conn.lock().map_err(|_| DbError::LockPoisoned)?;
        f(&mut *guard)
    }

    fn connection(&self) -> DbResult<&Mutex<Connection>> {
        self.conn.get_or_try_init(|| {
            let conn = match &self.location {
                StoreLocation::File(path) => open_db(path, self.mode)?,
                StoreLocation::Memory => open_db_in_memory()?,
            };
            Ok(Mutex::new(conn))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::NoteStore;
    use crate::db::DbError;

    #[test]
    fn store_opens_lazily_and_reuses_connection() {
        let store = NoteStore::in_memory();
        assert!(!store.is_open());

        store
            .with_connection(|conn| {
                conn.execute("INSERT INTO notes (title, body) VALUES ('a', 'b');", [])
                    .map_err(DbError::from)
            })
            .expect("insert through shared connection");
        assert!(store.is_open());

        let count: i64 = store
            .with_connection(|conn| {
                conn.query_row("SELECT COUNT(*) FROM notes;", [], |row| row.get(0))
                    .map_err(DbError::from)
            })
            .expect("count through shared connection");
        assert_eq!(count, 1);
    }

    #[test]
    fn failed_open_leaves_store_unopened() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = NoteStore::file(dir.path().join("missing").join("Notes.db"));

        let err = store.ensure_open().expect_err("parent directory does not exist");
        assert!(matches!(err, DbError::Sqlite(_)));
        assert!(!store.is_open());
    }
}
