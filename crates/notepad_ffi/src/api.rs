//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose list/editor use cases to Dart via FRB.
//! - Map provider errors into flat response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - One provider per process, configured from `NOTEPAD_*` variables on
//!   first use.
//! - `notes_revision` only moves forward.

use log::warn;
use notepad_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    ChangeEvent, DeleteOutcome, FnListener, Note, NoteProvider, NoteService, NoteStore,
    NotepadConfig, SaveOutcome,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

static NOTE_SERVICE: OnceLock<Result<NoteService, String>> = OnceLock::new();
static NOTES_REVISION: AtomicU64 = AtomicU64::new(0);

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One note as rendered by the list and editor screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: i64,
    pub title: String,
    pub body: String,
    /// Title for list rows, with the untitled fallback applied.
    pub display_title: String,
}

impl From<Note> for NoteItem {
    fn from(note: Note) -> Self {
        let display_title = note.display_title().to_string();
        Self {
            id: note.id,
            title: note.title,
            body: note.body,
            display_title,
        }
    }
}

/// Response envelope for the list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesListResponse {
    pub ok: bool,
    /// Notes in creation order (empty on failure).
    pub items: Vec<NoteItem>,
    pub message: String,
}

/// Response envelope for loading one note into the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteGetResponse {
    pub ok: bool,
    /// `None` when the note does not exist or the lookup failed.
    pub note: Option<NoteItem>,
    pub message: String,
}

/// Generic action response envelope for create/save/delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Created note ID, set only by a create that wrote a row.
    pub note_id: Option<i64>,
    /// User-facing message; empty when nothing was written.
    pub message: String,
}

impl NoteActionResponse {
    fn success(message: impl Into<String>, note_id: Option<i64>) -> Self {
        Self {
            ok: true,
            note_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            note_id: None,
            message: message.into(),
        }
    }

    fn from_save(outcome: SaveOutcome) -> Self {
        match outcome {
            SaveOutcome::Created(id) => Self::success(outcome.message(), Some(id)),
            SaveOutcome::Updated | SaveOutcome::Skipped => Self::success(outcome.message(), None),
            SaveOutcome::Failed => Self::failure(outcome.message()),
        }
    }
}

/// Lists every note in creation order.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_list() -> NotesListResponse {
    match with_note_service(|service| service.list_notes().map_err(|err| err.to_string())) {
        Ok(notes) => {
            let items = notes.into_iter().map(NoteItem::from).collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No notes.".to_string()
            } else {
                format!("Loaded {} note(s).", items.len())
            };
            NotesListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => NotesListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("notes_list failed: {err}"),
        },
    }
}

/// Loads one note for the editor.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - A missing note is `ok=true` with `note=None`.
#[flutter_rust_bridge::frb(sync)]
pub fn note_get(id: i64) -> NoteGetResponse {
    match with_note_service(|service| service.get_note(id).map_err(|err| err.to_string())) {
        Ok(Some(note)) => NoteGetResponse {
            ok: true,
            note: Some(NoteItem::from(note)),
            message: String::new(),
        },
        Ok(None) => NoteGetResponse {
            ok: true,
            note: None,
            message: "Note not found.".to_string(),
        },
        Err(err) => NoteGetResponse {
            ok: false,
            note: None,
            message: format!("note_get failed: {err}"),
        },
    }
}

/// Creates a note from editor input.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Input is trimmed; blank title and body write nothing (`ok=true`,
///   `note_id=None`).
#[flutter_rust_bridge::frb(sync)]
pub fn note_create(title: String, body: String) -> NoteActionResponse {
    match with_note_service(|service| {
        service
            .create_note(&title, &body)
            .map_err(|err| err.to_string())
    }) {
        Ok(outcome) => NoteActionResponse::from_save(outcome),
        Err(err) => NoteActionResponse::failure(format!("note_create failed: {err}")),
    }
}

/// Replaces title and body of an existing note.
#[flutter_rust_bridge::frb(sync)]
pub fn note_save(id: i64, title: String, body: String) -> NoteActionResponse {
    match with_note_service(|service| {
        service
            .save_note(id, &title, &body)
            .map_err(|err| err.to_string())
    }) {
        Ok(outcome) => NoteActionResponse::from_save(outcome),
        Err(err) => NoteActionResponse::failure(format!("note_save failed: {err}")),
    }
}

/// Permanently deletes one note.
#[flutter_rust_bridge::frb(sync)]
pub fn note_delete(id: i64) -> NoteActionResponse {
    match with_note_service(|service| service.delete_note(id).map_err(|err| err.to_string())) {
        Ok(outcome @ DeleteOutcome::Deleted) => NoteActionResponse::success(outcome.message(), None),
        Ok(outcome @ DeleteOutcome::NotDeleted) => NoteActionResponse::failure(outcome.message()),
        Err(err) => NoteActionResponse::failure(format!("note_delete failed: {err}")),
    }
}

/// MIME-style type of a note resource identifier.
///
/// # FFI contract
/// - Never panics; returns empty string for identifiers the provider does
///   not recognize.
#[flutter_rust_bridge::frb(sync)]
pub fn note_resource_type(uri: String) -> String {
    with_note_service(|service| {
        service
            .provider()
            .get_type(&uri)
            .map_err(|err| err.to_string())
    })
    .unwrap_or_default()
}

/// Change counter bumped after every insert, update or delete that touched
/// rows. The list screen refreshes when it moves.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_revision() -> u64 {
    NOTES_REVISION.load(Ordering::SeqCst)
}

fn note_service() -> Result<&'static NoteService, String> {
    NOTE_SERVICE
        .get_or_init(build_note_service)
        .as_ref()
        .map_err(Clone::clone)
}

fn build_note_service() -> Result<NoteService, String> {
    let config = NotepadConfig::from_env().map_err(|err| {
        warn!("event=ffi_init module=ffi status=error error_code=invalid_config");
        format!("notepad config invalid: {err}")
    })?;
    let listener = FnListener(|_event: &ChangeEvent| {
        NOTES_REVISION.fetch_add(1, Ordering::SeqCst);
    });
    let provider = NoteProvider::new(
        config.authority,
        Arc::new(NoteStore::file(config.db_path)),
        Arc::new(listener),
    );
    Ok(NoteService::new(Arc::new(provider)))
}

fn with_note_service<T>(
    f: impl FnOnce(&NoteService) -> Result<T, String>,
) -> Result<T, String> {
    let service = note_service()?;
    f(service)
}
