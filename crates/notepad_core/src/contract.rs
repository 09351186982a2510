//! Static schema and addressing contract for the notes store.
//!
//! # Responsibility
//! - Name the single `notes` table and its columns.
//! - Define the resource addressing scheme and content type strings.
//!
//! # Invariants
//! - There is exactly one table; every row has non-null `title` and `body`.
//! - Item identifiers are the collection identifier plus one numeric segment.

use crate::model::note::NoteId;

/// Authority used when no other authority is configured.
pub const DEFAULT_AUTHORITY: &str = "com.example.android.notepad";
/// Scheme prefix of fully qualified resource identifiers.
pub const CONTENT_SCHEME: &str = "content";
/// Path segment addressing the note collection.
pub const PATH_NOTES: &str = "notes";

pub const TABLE_NAME: &str = "notes";
pub const COLUMN_ID: &str = "_id";
pub const COLUMN_TITLE: &str = "title";
pub const COLUMN_BODY: &str = "body";

/// Content type prefix for a list of rows.
pub const CURSOR_DIR_BASE_TYPE: &str = "vnd.android.cursor.dir";
/// Content type prefix for a single row.
pub const CURSOR_ITEM_BASE_TYPE: &str = "vnd.android.cursor.item";

/// DDL executed once per fresh database file.
pub const SQL_CREATE_NOTES: &str = include_str!("db/migrations/0001_notes.sql");

/// Content type describing the whole note collection.
pub fn content_list_type(authority: &str) -> String {
    format!("{CURSOR_DIR_BASE_TYPE}/{authority}/{PATH_NOTES}")
}

/// Content type describing one note.
pub fn content_item_type(authority: &str) -> String {
    format!("{CURSOR_ITEM_BASE_TYPE}/{authority}/{PATH_NOTES}")
}

/// Fully qualified identifier of the note collection.
pub fn content_uri(authority: &str) -> String {
    format!("{CONTENT_SCHEME}://{authority}/{PATH_NOTES}")
}

/// Collection identifier with `id` appended as the last segment.
pub fn item_uri(authority: &str, id: NoteId) -> String {
    format!("{}/{id}", content_uri(authority))
}
