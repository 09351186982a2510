//! Resource-addressed CRUD over the notes store.
//!
//! # Responsibility
//! - Resolve resource identifiers and reject unknown shapes.
//! - Validate write payloads before they reach the repository.
//! - Execute requests on the shared store and notify the configured listener
//!   after every mutation that affected rows.
//!
//! # Invariants
//! - Item requests always target exactly `_id = k`; a caller filter is
//!   ignored for them.
//! - A change event is emitted if and only if a mutation affected >= 1 row.
//! - Insert store failures are returned as `Ok(None)`; every other storage
//!   failure is an `Err`.

use crate::contract;
use crate::db::NoteStore;
use crate::model::note::{NoteValidationError, NoteValues};
use crate::model::query::{NoteFilter, Projection, SortOrder};
use crate::repo::note_repo::{NoteRepository, SqliteNoteRepository};
use crate::repo::RepoError;
use crate::resource::{resolve_resource, NoteResource};
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub mod cursor;
pub mod notify;

pub use cursor::{NoteCursor, DEFAULT_PAGE_SIZE};
pub use notify::{ChangeEvent, ChangeKind, ChangeListener, FnListener, NoopListener};

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Error returned by provider operations.
#[derive(Debug)]
pub enum ProviderError {
    /// The identifier does not name a resource, or the operation is not
    /// supported for that resource shape.
    InvalidResource {
        uri: String,
        operation: &'static str,
    },
    /// A write payload is missing a required field or carries a null.
    Validation(NoteValidationError),
    /// The store could not be opened or rejected the request.
    Storage(RepoError),
}

impl ProviderError {
    pub fn is_invalid_resource(&self) -> bool {
        matches!(self, Self::InvalidResource { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidResource { uri, operation } => {
                write!(f, "{operation} is not supported for `{uri}`")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProviderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidResource { .. } => None,
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<NoteValidationError> for ProviderError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ProviderError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

impl From<crate::db::DbError> for ProviderError {
    fn from(value: crate::db::DbError) -> Self {
        Self::Storage(RepoError::Db(value))
    }
}

/// Record access layer over one authority and one shared store.
pub struct NoteProvider {
    authority: String,
    store: Arc<NoteStore>,
    listener: Arc<dyn ChangeListener>,
    page_size: u32,
}

impl NoteProvider {
    pub fn new(
        authority: impl Into<String>,
        store: Arc<NoteStore>,
        listener: Arc<dyn ChangeListener>,
    ) -> Self {
        Self {
            authority: authority.into(),
            store,
            listener,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Overrides how many rows cursors fetch per page.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn store(&self) -> &Arc<NoteStore> {
        &self.store
    }

    /// Canonical identifier of the note collection.
    pub fn content_uri(&self) -> String {
        contract::content_uri(&self.authority)
    }

    /// Classifies `uri` against this provider's authority.
    pub fn resolve(&self, uri: &str) -> Option<NoteResource> {
        resolve_resource(&self.authority, uri)
    }

    /// Queries the collection or one item.
    pub fn query(
        &self,
        uri: &str,
        projection: &Projection,
        filter: Option<&NoteFilter>,
        sort: SortOrder,
    ) -> ProviderResult<NoteCursor> {
        let resource = self.require_resource(uri, "query")?;
        let filter = effective_filter(resource, filter);
        debug!(
            "event=note_query module=provider status=start resource={}",
            resource_label(resource)
        );

        NoteCursor::open(
            Arc::clone(&self.store),
            projection.clone(),
            filter,
            sort,
            resource.to_uri(&self.authority),
            self.page_size,
        )
    }

    /// Inserts one note into the collection.
    ///
    /// Returns the new item identifier, or `None` when the store rejected the
    /// write so the caller can offer a retry.
    pub fn insert(&self, uri: &str, values: &NoteValues) -> ProviderResult<Option<String>> {
        let resource = self.require_resource(uri, "insert")?;
        if resource != NoteResource::Collection {
            return Err(invalid_resource(uri, "insert"));
        }
        let (title, body) = values.validate_for_insert()?;

        self.store.ensure_open()?;
        let inserted = self
            .store
            .with_connection(|conn| SqliteNoteRepository::new(conn).insert_note(title, body));

        match inserted {
            Ok(id) => {
                info!("event=note_insert module=provider status=ok note_id={id}");
                self.notify(NoteResource::Collection, ChangeKind::Inserted, 1);
                Ok(Some(contract::item_uri(&self.authority, id)))
            }
            Err(err) => {
                error!(
                    "event=note_insert module=provider status=error error_code=insert_failed error={err}"
                );
                Ok(None)
            }
        }
    }

    /// Updates the note fields present in `values`.
    pub fn update(
        &self,
        uri: &str,
        values: &NoteValues,
        filter: Option<&NoteFilter>,
    ) -> ProviderResult<usize> {
        let resource = self.require_resource(uri, "update")?;
        let changes = values.validate_for_update()?;
        if changes.is_empty() {
            return Ok(0);
        }

        let filter = effective_filter(resource, filter);
        let rows = self.store.with_connection(|conn| {
            SqliteNoteRepository::new(conn).update_notes(changes, filter.as_ref())
        })?;
        info!(
            "event=note_update module=provider status=ok resource={} rows={rows}",
            resource_label(resource)
        );
        if rows > 0 {
            self.notify(resource, ChangeKind::Updated, rows);
        }
        Ok(rows)
    }

    /// Deletes the addressed note(s).
    pub fn delete(&self, uri: &str, filter: Option<&NoteFilter>) -> ProviderResult<usize> {
        let resource = self.require_resource(uri, "delete")?;
        let filter = effective_filter(resource, filter);
        let rows = self
            .store
            .with_connection(|conn| SqliteNoteRepository::new(conn).delete_notes(filter.as_ref()))?;
        info!(
            "event=note_delete module=provider status=ok resource={} rows={rows}",
            resource_label(resource)
        );
        if rows > 0 {
            self.notify(resource, ChangeKind::Deleted, rows);
        }
        Ok(rows)
    }

    /// Content type of the addressed resource.
    pub fn get_type(&self, uri: &str) -> ProviderResult<String> {
        match self.require_resource(uri, "get_type")? {
            NoteResource::Collection => Ok(contract::content_list_type(&self.authority)),
            NoteResource::Item(_) => Ok(contract::content_item_type(&self.authority)),
        }
    }

    fn require_resource(&self, uri: &str, operation: &'static str) -> ProviderResult<NoteResource> {
        self.resolve(uri)
            .ok_or_else(|| invalid_resource(uri, operation))
    }

    fn notify(&self, resource: NoteResource, kind: ChangeKind, rows: usize) {
        let event = ChangeEvent {
            uri: resource.to_uri(&self.authority),
            resource,
            kind,
            rows,
        };
        debug!(
            "event=change_notify module=provider status=ok resource={} rows={rows}",
            resource_label(resource)
        );
        self.listener.on_change(&event);
    }
}

fn effective_filter(resource: NoteResource, filter: Option<&NoteFilter>) -> Option<NoteFilter> {
    match resource {
        NoteResource::Collection => filter.cloned(),
        NoteResource::Item(id) => Some(NoteFilter::IdEquals(id)),
    }
}

fn invalid_resource(uri: &str, operation: &'static str) -> ProviderError {
    ProviderError::InvalidResource {
        uri: uri.to_string(),
        operation,
    }
}

fn resource_label(resource: NoteResource) -> String {
    match resource {
        NoteResource::Collection => "collection".to_string(),
        NoteResource::Item(id) => format!("item:{id}"),
    }
}
