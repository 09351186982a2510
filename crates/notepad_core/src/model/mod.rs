//! Domain model for note records and note queries.
//!
//! # Responsibility
//! - Define the `Note` record and the field payload used to write it.
//! - Define the typed projection/filter/sort vocabulary used to read it.
//!
//! # Invariants
//! - Every persisted note has non-null `title` and `body`.
//! - `id` is assigned by the store and never changes.

pub mod note;
pub mod query;
