//! Event Recorder - owns the page, the port and the document listeners
//!
//! Lifecycle:
//! - `initialize` opens the port (named after the page host), subscribes to
//!   its disconnect notification and registers one capturing, passive
//!   listener per recorded event type
//! - `handle_event` runs synchronously for each dispatched DOM event
//! - a disconnect from the background side removes the listeners;
//!   `shutdown` does the same from the page side

use protocol::{EventType, ParsedEvent};
use std::sync::Arc;

use crate::config::RecorderConfig;
use crate::error::Result;
use crate::events::DomEvent;
use crate::listeners::ListenerRegistry;
use crate::page::Page;
use crate::parser::EventParser;
use crate::port::{Port, PortReceiver};

pub struct EventRecorder {
    pub config: RecorderConfig,
    page: Page,
    port: Port,
    listeners: Arc<ListenerRegistry>,
    parser: EventParser,
}

impl EventRecorder {
    /// Start recording `page`. The returned receiver is the background end
    /// of the port.
    pub fn initialize(page: Page, config: RecorderConfig) -> (Self, PortReceiver) {
        let (port, receiver) = Port::connect(page.hostname());
        let listeners = Arc::new(ListenerRegistry::new());

        let registry = Arc::clone(&listeners);
        port.on_disconnect(Arc::new(move || {
            registry.clear();
            tracing::info!("Port disconnected, DOM listeners removed");
        }));

        let recorder = Self {
            parser: EventParser::new(&config),
            config,
            page,
            port,
            listeners,
        };
        recorder.add_dom_listeners();

        (recorder, receiver)
    }

    fn add_dom_listeners(&self) {
        let options = self.config.listener_options();
        for event in EventType::ALL {
            self.listeners.add_event_listener(event, options);
        }
    }

    fn remove_dom_listeners(&self) {
        for event in EventType::ALL {
            self.listeners
                .remove_event_listener(event, self.config.capture);
        }
    }

    /// Process one dispatched DOM event. Returns true when a record was
    /// posted to the background side.
    pub fn handle_event(&self, event: &DomEvent) -> bool {
        let Some(kind) = event.kind() else {
            return false;
        };
        if !self.listeners.is_listening(kind) {
            return false;
        }
        if !event.is_trusted {
            tracing::debug!("Ignoring synthetic {} event", kind);
            return false;
        }

        let parsed = match self.parse_event(event) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Failed to parse {} event: {}", kind, e);
                return false;
            }
        };
        tracing::debug!(
            "Recorded {} on {} ({})",
            kind,
            parsed.selector,
            dom::utils::cap_text_length(parsed.inner_text.as_deref().unwrap_or(""), 40)
        );

        match self.port.post_message(parsed) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Dropped {} event: {}", kind, e);
                false
            }
        }
    }

    /// Describe an event without posting it
    pub fn parse_event(&self, event: &DomEvent) -> Result<ParsedEvent> {
        self.parser.parse(&self.page, event)
    }

    pub fn is_listening(&self, event: EventType) -> bool {
        self.listeners.is_listening(event)
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn port(&self) -> &Port {
        &self.port
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// The page changes between events (typed values, toggled menus)
    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    /// Stop recording from the page side
    pub fn shutdown(self) {
        self.remove_dom_listeners();
        self.port.disconnect();
    }
}
