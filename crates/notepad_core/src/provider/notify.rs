//! Change notification for observers of note resources.
//!
//! Listeners are handed to the provider at construction. Delivery is
//! synchronous and fire-and-forget: the provider never waits on or reacts to
//! what a listener does with an event.

use crate::resource::{resolve_resource, NoteResource};
use crossbeam::channel::Sender;
use serde::{Deserialize, Serialize};

/// Kind of mutation that produced a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Inserted,
    Updated,
    Deleted,
}

/// Signal emitted after a mutation affected at least one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Canonical identifier of the resource the mutation addressed.
    pub uri: String,
    pub resource: NoteResource,
    pub kind: ChangeKind,
    /// Rows affected; always at least 1.
    pub rows: usize,
}

impl ChangeEvent {
    /// Returns whether an observer of `observed_uri` should refresh.
    ///
    /// Collection observers see every change; item observers see changes to
    /// their item and collection-wide changes.
    pub fn concerns(&self, authority: &str, observed_uri: &str) -> bool {
        resolve_resource(authority, observed_uri)
            .is_some_and(|observed| observed.overlaps(self.resource))
    }
}

/// Receiver of change events.
pub trait ChangeListener: Send + Sync {
    fn on_change(&self, event: &ChangeEvent);
}

/// Listener that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl ChangeListener for NoopListener {
    fn on_change(&self, _event: &ChangeEvent) {}
}

/// Adapter turning a closure into a listener.
pub struct FnListener<F>(pub F);

impl<F> ChangeListener for FnListener<F>
where
    F: Fn(&ChangeEvent) + Send + Sync,
{
    fn on_change(&self, event: &ChangeEvent) {
        (self.0)(event)
    }
}

impl ChangeListener for Sender<ChangeEvent> {
    fn on_change(&self, event: &ChangeEvent) {
        // A dropped receiver means nobody is observing anymore.
        let _ = self.send(event.clone());
    }
}
