//! Session Recorder
//!
//! Listens for trusted user events on a page, describes each event target
//! with a stable locator and posts the description to the background side
//! over a named port.
//!
//! ```text
//! DomEvent → EventRecorder → EventParser → ParsedEvent → Port → PortReceiver
//!                 ↑                ↑
//!         ListenerRegistry    Page (URL + DomArena)
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod listeners;
pub mod page;
pub mod parser;
pub mod port;
pub mod recorder;

pub use config::RecorderConfig;
pub use error::{RecorderError, Result};
pub use events::DomEvent;
pub use listeners::{ListenerOptions, ListenerRegistry};
pub use page::Page;
pub use parser::EventParser;
pub use port::{Port, PortError, PortReceiver};
pub use recorder::EventRecorder;
