//! Forward-only, lazily paged query results.
//!
//! # Invariants
//! - Rows are fetched one page at a time, only when the buffer runs dry.
//! - A cursor cannot rewind; re-issue the query to read the rows again.
//! - After a fetch error the cursor yields that error once and then ends.
//! - Each page resumes after the sort key of the previous page's last row.
//!   Rows the cursor has not reached yet are returned exactly once even when
//!   rows it already returned are deleted.

use crate::db::NoteStore;
use crate::model::note::Note;
use crate::model::query::{NoteFilter, Projection, SortOrder};
use crate::provider::{ProviderError, ProviderResult};
use crate::repo::note_repo::{
    NoteRepository, NoteRow, PageKey, PageRequest, SqliteNoteRepository,
};
use crate::repo::RepoError;
use std::collections::VecDeque;
use std::sync::Arc;

/// Rows fetched per round trip to the store.
pub const DEFAULT_PAGE_SIZE: u32 = 64;

/// Result sequence of a provider query.
pub struct NoteCursor {
    store: Arc<NoteStore>,
    projection: Projection,
    filter: Option<NoteFilter>,
    sort: SortOrder,
    notification_uri: String,
    page_size: u32,
    resume_after: Option<PageKey>,
    buffer: VecDeque<NoteRow>,
    exhausted: bool,
}

impl NoteCursor {
    /// Creates a cursor and fetches its first page eagerly so storage errors
    /// reach the caller of `query`.
    pub(crate) fn open(
        store: Arc<NoteStore>,
        projection: Projection,
        filter: Option<NoteFilter>,
        sort: SortOrder,
        notification_uri: String,
        page_size: u32,
    ) -> ProviderResult<Self> {
        let mut cursor = Self {
            store,
            projection,
            filter,
            sort,
            notification_uri,
            page_size: page_size.max(1),
            resume_after: None,
            buffer: VecDeque::new(),
            exhausted: false,
        };
        cursor.fetch_page()?;
        Ok(cursor)
    }

    /// Identifier observers of this result should watch for changes.
    pub fn notification_uri(&self) -> &str {
        &self.notification_uri
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Drains the cursor into full notes.
    ///
    /// Fails when the projection leaves out a column of `Note`.
    pub fn into_notes(self) -> ProviderResult<Vec<Note>> {
        let mut notes = Vec::new();
        for row in self {
            let note = row?.into_note().ok_or_else(|| {
                ProviderError::Storage(RepoError::InvalidData(
                    "query projection does not cover every note column".to_string(),
                ))
            })?;
            notes.push(note);
        }
        Ok(notes)
    }

    fn fetch_page(&mut self) -> ProviderResult<()> {
        let page = PageRequest {
            limit: self.page_size,
            after: self.resume_after.take(),
        };
        let fetched = self.store.with_connection(|conn| {
            SqliteNoteRepository::new(conn).select_notes(
                &self.projection,
                self.filter.as_ref(),
                self.sort,
                &page,
            )
        })?;

        if fetched.rows.len() < self.page_size as usize {
            self.exhausted = true;
        }
        self.resume_after = fetched.last_key.or(page.after);
        self.buffer.extend(fetched.rows);
        Ok(())
    }
}

impl Iterator for NoteCursor {
    type Item = ProviderResult<NoteRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(err) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(err));
            }
        }
        self.buffer.pop_front().map(Ok)
    }
}

impl std::fmt::Debug for NoteCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteCursor")
            .field("notification_uri", &self.notification_uri)
            .field("resume_after", &self.resume_after)
            .field("buffered", &self.buffer.len())
            .field("exhausted", &self.exhausted)
            .finish()
    }
}
