//! Document-level listener registry
//!
//! The recorder listens on the document for a fixed set of event types.
//! This registry is the document's view of those listeners: which types are
//! being listened for, and with which dispatch options.

use dashmap::DashMap;
use protocol::EventType;
use serde::{Deserialize, Serialize};

/// `addEventListener` options that matter to the recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerOptions {
    /// Observe the event on the way down, before page handlers can stop it
    pub capture: bool,
    /// Never call `preventDefault`
    pub passive: bool,
}

impl Default for ListenerOptions {
    fn default() -> Self {
        Self {
            capture: true,
            passive: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct ListenerRegistry {
    listeners: DashMap<EventType, ListenerOptions>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Re-adding a type replaces its options.
    pub fn add_event_listener(&self, event: EventType, options: ListenerOptions) {
        tracing::debug!("Listening for {} (capture: {})", event, options.capture);
        self.listeners.insert(event, options);
    }

    /// Remove a listener. Like the DOM, the capture flag must match.
    pub fn remove_event_listener(&self, event: EventType, capture: bool) -> bool {
        self.listeners
            .remove_if(&event, |_, options| options.capture == capture)
            .is_some()
    }

    pub fn listener_for(&self, event: EventType) -> Option<ListenerOptions> {
        self.listeners.get(&event).map(|entry| *entry.value())
    }

    pub fn is_listening(&self, event: EventType) -> bool {
        self.listeners.contains_key(&event)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Drop every listener
    pub fn clear(&self) {
        self.listeners.clear();
    }
}
