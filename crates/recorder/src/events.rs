//! DOM events as the page dispatches them
//!
//! `event_type` is the raw DOM name: pages fire plenty of events the
//! recorder does not care about, and those must pass through untouched.

use dom::NodeId;
use protocol::EventType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomEvent {
    pub event_type: String,
    pub target: NodeId,
    /// Set by the browser for real user input, false for script-dispatched events
    pub is_trusted: bool,
    /// `KeyboardEvent.key`, for keyboard events
    pub key: Option<String>,
}

impl DomEvent {
    pub fn new(event_type: impl Into<String>, target: NodeId, is_trusted: bool) -> Self {
        Self {
            event_type: event_type.into(),
            target,
            is_trusted,
            key: None,
        }
    }

    /// Event produced by genuine user interaction
    pub fn trusted(event_type: EventType, target: NodeId) -> Self {
        Self::new(event_type.as_str(), target, true)
    }

    /// Event dispatched by page script (`element.dispatchEvent(...)`)
    pub fn synthetic(event_type: EventType, target: NodeId) -> Self {
        Self::new(event_type.as_str(), target, false)
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// The recorded category, if this is one
    pub fn kind(&self) -> Option<EventType> {
        self.event_type.parse().ok()
    }
}
