//! Connection bootstrap for the notes database.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections in read or write mode.
//! - Bring the schema to the target version before handing a connection out.
//!
//! # Invariants
//! - Returned connections always see a schema at the target version.
//! - Read-only connections never run DDL themselves; the schema is prepared
//!   through a short-lived read-write connection first.

use super::migrations::{apply_schema, SchemaAction, DATABASE_VERSION};
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Access mode requested by a caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OpenMode {
    ReadOnly,
    #[default]
    ReadWrite,
}

impl OpenMode {
    fn label(self) -> &'static str {
        match self {
            Self::ReadOnly => "read",
            Self::ReadWrite => "write",
        }
    }
}

/// Opens (creating if absent) the notes database at the current schema version.
///
/// The returned connection is owned by the caller and released on drop.
///
/// # Side effects
/// - Creates the file and schema on first use.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>, mode: OpenMode) -> DbResult<Connection> {
    open_db_with_version(path, mode, DATABASE_VERSION)
}

/// Same as [`open_db`] with an explicit target schema version.
pub fn open_db_with_version(
    path: impl AsRef<Path>,
    mode: OpenMode,
    version: u32,
) -> DbResult<Connection> {
    let path = path.as_ref();
    let started_at = Instant::now();
    info!(
        "event=db_open module=db status=start mode=file access={}",
        mode.label()
    );

    match open_file(path, mode, version) {
        Ok((conn, action)) => {
            info!(
                "event=db_open module=db status=ok mode=file access={} schema={} duration_ms={}",
                mode.label(),
                schema_label(action),
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=file access={} duration_ms={} error_code={} error={}",
                mode.label(),
                started_at.elapsed().as_millis(),
                error_code(&err),
                err
            );
            Err(err)
        }
    }
}

/// Opens an in-memory notes database with the schema applied.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    let result = Connection::open_in_memory()
        .map_err(DbError::from)
        .and_then(|mut conn| bootstrap_connection(&mut conn, DATABASE_VERSION).map(|_| conn));

    match &result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode=memory duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode=memory duration_ms={} error_code={} error={}",
            started_at.elapsed().as_millis(),
            error_code(err),
            err
        ),
    }
    result
}

fn open_file(path: &Path, mode: OpenMode, version: u32) -> DbResult<(Connection, SchemaAction)> {
    let mut conn = Connection::open(path)?;
    let action = bootstrap_connection(&mut conn, version)?;

    match mode {
        OpenMode::ReadWrite => Ok((conn, action)),
        OpenMode::ReadOnly => {
            drop(conn);
            let conn = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            conn.busy_timeout(BUSY_TIMEOUT)?;
            Ok((conn, action))
        }
    }
}

fn bootstrap_connection(conn: &mut Connection, version: u32) -> DbResult<SchemaAction> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_schema(conn, version)
}

fn schema_label(action: SchemaAction) -> String {
    match action {
        SchemaAction::Created => "created".to_string(),
        SchemaAction::Upgraded { from, to } => format!("upgraded_{from}_to_{to}"),
        SchemaAction::Unchanged => "unchanged".to_string(),
    }
}

fn error_code(err: &DbError) -> &'static str {
    match err {
        DbError::Sqlite(_) => "db_open_failed",
        DbError::UnsupportedSchemaVersion { .. } => "db_schema_unsupported",
        DbError::LockPoisoned => "db_lock_poisoned",
    }
}
