//! Resource identifier classification.
//!
//! # Responsibility
//! - Map an external identifier to the collection or to one note by id.
//! - Render canonical identifiers back from a classified resource.
//!
//! # Invariants
//! - Classification is pure: no registry, no global mutable state.
//! - Only `notes` and `notes/<digits>` paths match; everything else is `None`.

use crate::contract::{self, CONTENT_SCHEME, PATH_NOTES};
use crate::model::note::NoteId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static NOTES_PATH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^{}(?:/([0-9]+))?$", regex::escape(PATH_NOTES)))
        .expect("valid notes path regex")
});

/// Addressable resource shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum NoteResource {
    /// Every note.
    Collection,
    /// One note by store id.
    Item(NoteId),
}

impl NoteResource {
    /// Canonical `content://<authority>/notes[/<id>]` identifier.
    pub fn to_uri(self, authority: &str) -> String {
        match self {
            Self::Collection => contract::content_uri(authority),
            Self::Item(id) => contract::item_uri(authority, id),
        }
    }

    pub fn item_id(self) -> Option<NoteId> {
        match self {
            Self::Collection => None,
            Self::Item(id) => Some(id),
        }
    }

    /// Returns whether `other` is this resource or nested under it (or vice versa).
    pub fn overlaps(self, other: NoteResource) -> bool {
        match (self, other) {
            (Self::Item(left), Self::Item(right)) => left == right,
            _ => true,
        }
    }
}

/// Classifies `uri` for the given authority.
///
/// Accepts `content://<authority>/notes[/<id>]` and the bare paths `notes` and
/// `notes/<id>`. A fully qualified identifier must name `authority`.
pub fn resolve_resource(authority: &str, uri: &str) -> Option<NoteResource> {
    let scheme_prefix = format!("{CONTENT_SCHEME}://");
    let path = match uri.strip_prefix(scheme_prefix.as_str()) {
        Some(rest) => {
            let (uri_authority, path) = rest.split_once('/')?;
            if uri_authority != authority {
                return None;
            }
            path
        }
        None => uri,
    };

    let captures = NOTES_PATH_RE.captures(path)?;
    match captures.get(1) {
        None => Some(NoteResource::Collection),
        Some(id) => id.as_str().parse::<NoteId>().ok().map(NoteResource::Item),
    }
}
