//! Note use-case service for the list and editor screens.
//!
//! # Responsibility
//! - Provide list-all/get-one/create/save-existing/delete-one entry points.
//! - Turn provider results into outcomes with user-facing messages.
//!
//! # Invariants
//! - Title and body are trimmed before they are written.
//! - Creating a note whose title and body are both blank writes nothing.

use crate::contract::{COLUMN_BODY, COLUMN_TITLE};
use crate::model::note::{Note, NoteId, NoteValues};
use crate::model::query::{Projection, SortOrder};
use crate::provider::{NoteProvider, ProviderError, ProviderResult};
use crate::resource::NoteResource;
use crate::repo::RepoError;
use std::sync::Arc;

/// Result of a create or save request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(NoteId),
    Updated,
    /// New note with blank title and body; nothing was written.
    Skipped,
    /// The store did not persist the change; the user may retry.
    Failed,
}

impl SaveOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Created(_) | Self::Updated)
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Created(_) => "Note has been saved",
            Self::Updated => "Note has been updated",
            Self::Skipped => "",
            Self::Failed => "Save failed, please try again.",
        }
    }
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotDeleted,
}

impl DeleteOutcome {
    pub fn message(self) -> &'static str {
        match self {
            Self::Deleted => "Successfully deleted.",
            Self::NotDeleted => "Error: Could not delete.",
        }
    }
}

/// Caller-facing note operations over a provider.
#[derive(Clone)]
pub struct NoteService {
    provider: Arc<NoteProvider>,
}

impl NoteService {
    pub fn new(provider: Arc<NoteProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<NoteProvider> {
        &self.provider
    }

    /// Every note in creation order.
    pub fn list_notes(&self) -> ProviderResult<Vec<Note>> {
        let uri = self.provider.content_uri();
        self.provider
            .query(&uri, &Projection::all(), None, SortOrder::Insertion)?
            .into_notes()
    }

    /// One note by id, or `None` when it does not exist.
    pub fn get_note(&self, id: NoteId) -> ProviderResult<Option<Note>> {
        let uri = self.item_uri(id);
        let mut cursor = self
            .provider
            .query(&uri, &Projection::all(), None, SortOrder::Insertion)?;
        match cursor.next() {
            Some(row) => Ok(row?.into_note()),
            None => Ok(None),
        }
    }

    /// Creates a note from editor input.
    pub fn create_note(&self, title: &str, body: &str) -> ProviderResult<SaveOutcome> {
        let title = title.trim();
        let body = body.trim();
        if title.is_empty() && body.is_empty() {
            return Ok(SaveOutcome::Skipped);
        }

        let uri = self.provider.content_uri();
        let values = NoteValues::with_note(title, body);
        let Some(item_uri) = self.provider.insert(&uri, &values)? else {
            return Ok(SaveOutcome::Failed);
        };
        match self.provider.resolve(&item_uri).and_then(NoteResource::item_id) {
            Some(id) => Ok(SaveOutcome::Created(id)),
            None => Err(ProviderError::Storage(RepoError::InvalidData(format!(
                "insert returned unexpected identifier `{item_uri}`"
            )))),
        }
    }

    /// Replaces title and body of an existing note.
    pub fn save_note(&self, id: NoteId, title: &str, body: &str) -> ProviderResult<SaveOutcome> {
        let mut values = NoteValues::new();
        values.put(COLUMN_TITLE, title.trim());
        values.put(COLUMN_BODY, body.trim());

        let rows = self.provider.update(&self.item_uri(id), &values, None)?;
        Ok(if rows == 0 {
            SaveOutcome::Failed
        } else {
            SaveOutcome::Updated
        })
    }

    /// Permanently removes one note.
    pub fn delete_note(&self, id: NoteId) -> ProviderResult<DeleteOutcome> {
        let rows = self.provider.delete(&self.item_uri(id), None)?;
        Ok(if rows == 0 {
            DeleteOutcome::NotDeleted
        } else {
            DeleteOutcome::Deleted
        })
    }

    fn item_uri(&self, id: NoteId) -> String {
        NoteResource::Item(id).to_uri(self.provider.authority())
    }
}
