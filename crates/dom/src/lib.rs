//! Page model for the session recorder
//!
//! Arena-backed DOM tree plus the queries the recorder needs to describe an
//! event target: visibility, rendered text, selectors and text anchors.
//!
//! ```text
//! CDP JSON → DomService → DomArena (owned) → SelectorFinder / TextMatch
//!                              ↓
//!                        NodeId (u32)
//! ```

pub mod arena;
pub mod error;
pub mod finder;
pub mod selector;
pub mod service;
pub mod text_match;
pub mod types;
pub mod utils;

pub use arena::DomArena;
pub use error::{DomError, Result};
pub use finder::{FinderConfig, SelectorFinder, TEST_ID_ATTRIBUTES};
pub use selector::{Selector, SelectorStep};
pub use service::{DomService, DomServiceConfig};
pub use text_match::{TextMatch, Visibility};
pub use types::*;
