//! Repository layer over the `notes` table.
//!
//! # Responsibility
//! - Translate typed filters, projections and changes into SQL.
//! - Isolate SQLite statement details from resource dispatch.
//!
//! # Invariants
//! - Repository writes only touch the `title` and `body` columns; `_id` is
//!   assigned by SQLite and never rewritten.
//! - Every value reaches SQL through bound parameters.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod note_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
