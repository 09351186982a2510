//! Note record and write payload.
//!
//! # Responsibility
//! - Define the canonical `Note` row shape.
//! - Carry create/update field values, including explicit nulls, and validate
//!   them before they reach SQL.
//!
//! # Invariants
//! - Insert payloads must carry non-null `title` and `body`.
//! - Update payloads may omit either field, but a present field is non-null.
//! - Keys other than `title` and `body` are carried but never written.

use crate::contract::{COLUMN_BODY, COLUMN_TITLE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned row id.
pub type NoteId = i64;

const UNTITLED_LABEL: &str = "(No title)";

/// One persisted note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub body: String,
}

impl Note {
    /// Title as shown in list rows; empty titles render as `(No title)`.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            UNTITLED_LABEL
        } else {
            self.title.as_str()
        }
    }
}

/// Validation failure for note write payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Insert payload has no `title` key.
    MissingTitle,
    /// Insert payload has no `body` key.
    MissingBody,
    /// `title` is present but explicitly null.
    NullTitle,
    /// `body` is present but explicitly null.
    NullBody,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTitle => write!(f, "note requires a `title` value"),
            Self::MissingBody => write!(f, "note requires a `body` value"),
            Self::NullTitle => write!(f, "`title` cannot be null"),
            Self::NullBody => write!(f, "`body` cannot be null"),
        }
    }
}

impl Error for NoteValidationError {}

/// Field payload for insert/update requests.
///
/// A key mapped to `None` is an explicit null, which is different from the
/// key being absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteValues {
    fields: BTreeMap<String, Option<String>>,
}

/// Validated field set for an update; `None` leaves the column unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteChanges<'a> {
    pub title: Option<&'a str>,
    pub body: Option<&'a str>,
}

impl NoteChanges<'_> {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none()
    }
}

impl NoteValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload with both recognized fields set.
    pub fn with_note(title: impl Into<String>, body: impl Into<String>) -> Self {
        let mut values = Self::new();
        values.put(COLUMN_TITLE, title);
        values.put(COLUMN_BODY, body);
        values
    }

    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.fields.insert(key.into(), Some(value.into()));
        self
    }

    pub fn put_null(&mut self, key: impl Into<String>) -> &mut Self {
        self.fields.insert(key.into(), None);
        self
    }

    /// Returns `None` when the key is absent and `Some(None)` for explicit null.
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        self.fields.get(key).map(|value| value.as_deref())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validates an insert payload and returns `(title, body)`.
    pub fn validate_for_insert(&self) -> Result<(&str, &str), NoteValidationError> {
        let title = match self.get(COLUMN_TITLE) {
            None => return Err(NoteValidationError::MissingTitle),
            Some(None) => return Err(NoteValidationError::NullTitle),
            Some(Some(value)) => value,
        };
        let body = match self.get(COLUMN_BODY) {
            None => return Err(NoteValidationError::MissingBody),
            Some(None) => return Err(NoteValidationError::NullBody),
            Some(Some(value)) => value,
        };
        Ok((title, body))
    }

    /// Validates only the recognized keys present in an update payload.
    pub fn validate_for_update(&self) -> Result<NoteChanges<'_>, NoteValidationError> {
        let title = match self.get(COLUMN_TITLE) {
            Some(None) => return Err(NoteValidationError::NullTitle),
            other => other.flatten(),
        };
        let body = match self.get(COLUMN_BODY) {
            Some(None) => return Err(NoteValidationError::NullBody),
            other => other.flatten(),
        };
        Ok(NoteChanges { title, body })
    }
}
