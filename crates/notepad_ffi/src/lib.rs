//! Flutter-facing bindings for the Notepad core.

pub mod api;
