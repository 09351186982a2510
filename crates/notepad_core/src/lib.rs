//! Core data layer for the Notepad app.
//! This crate owns the note schema, the SQLite store and the resource-addressed
//! CRUD contract every screen goes through.

pub mod config;
pub mod contract;
pub mod db;
pub mod logging;
pub mod model;
pub mod provider;
pub mod repo;
pub mod resource;
pub mod service;

pub use config::{ConfigError, NotepadConfig};
pub use db::{DbError, NoteStore, OpenMode};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{Note, NoteId, NoteValidationError, NoteValues};
pub use model::query::{Column, NoteFilter, Projection, SortOrder};
pub use provider::{
    ChangeEvent, ChangeKind, ChangeListener, FnListener, NoopListener, NoteCursor, NoteProvider,
    ProviderError, ProviderResult,
};
pub use repo::note_repo::NoteRow;
pub use repo::{RepoError, RepoResult};
pub use resource::{resolve_resource, NoteResource};
pub use service::note_service::{DeleteOutcome, NoteService, SaveOutcome};
pub use service::worker::{NoteWorker, Pending, WorkerError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
