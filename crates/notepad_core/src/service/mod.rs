//! Core use-case services.
//!
//! # Responsibility
//! - Expose the operations the list and editor screens call.
//! - Run those operations on a background worker when the caller must not
//!   block.

pub mod note_service;
pub mod worker;
