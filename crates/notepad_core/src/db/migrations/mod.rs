//! Schema lifecycle: create on first use, upgrade on version bump.
//!
//! # Invariants
//! - `on_create` runs exactly once per fresh database (`user_version = 0`).
//! - Create/upgrade and the `user_version` write commit in one transaction.
//! - A database newer than the requested version is rejected, never
//!   downgraded.
//!
//! The upgrade policy is destructive: every note is dropped and the table is
//! recreated. The schema has only ever had version 1, so no real migration
//! path exists yet. Any future schema change must replace `on_upgrade` with a
//! data-preserving migration before `DATABASE_VERSION` is bumped.

use crate::contract::{SQL_CREATE_NOTES, TABLE_NAME};
use crate::db::{DbError, DbResult};
use log::{info, warn};
use rusqlite::Connection;

/// Schema version this binary creates and expects.
pub const DATABASE_VERSION: u32 = 1;

/// Outcome of bringing a database to the requested version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaAction {
    Created,
    Upgraded { from: u32, to: u32 },
    Unchanged,
}

/// Brings `conn` to `target_version`, creating or upgrading as needed.
pub fn apply_schema(conn: &mut Connection, target_version: u32) -> DbResult<SchemaAction> {
    let current_version = current_user_version(conn)?;

    if current_version > target_version {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: target_version,
        });
    }
    if current_version == target_version {
        return Ok(SchemaAction::Unchanged);
    }

    let tx = conn.transaction()?;
    let action = if current_version == 0 {
        on_create(&tx)?;
        SchemaAction::Created
    } else {
        on_upgrade(&tx, current_version, target_version)?;
        SchemaAction::Upgraded {
            from: current_version,
            to: target_version,
        }
    };
    tx.execute_batch(&format!("PRAGMA user_version = {target_version};"))?;
    tx.commit()?;

    Ok(action)
}

/// Creates the notes table.
pub fn on_create(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(SQL_CREATE_NOTES)?;
    info!("event=db_create module=db status=ok table={TABLE_NAME}");
    Ok(())
}

/// Destructive upgrade: drops all notes and recreates the table.
pub fn on_upgrade(conn: &Connection, old_version: u32, new_version: u32) -> DbResult<()> {
    let dropped_rows: i64 =
        conn.query_row(&format!("SELECT COUNT(*) FROM {TABLE_NAME};"), [], |row| {
            row.get(0)
        })?;
    warn!(
        "event=db_upgrade module=db status=start from={old_version} to={new_version} data_loss=true dropped_rows={dropped_rows}"
    );
    conn.execute_batch(&format!("DROP TABLE {TABLE_NAME};"))?;
    on_create(conn)
}

/// Reads the schema version stored in the database header.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
