//! Cypress statement generation
//!
//! One recorded event becomes at most one line of script. Events with
//! nothing worth replaying (plain character keys, checkbox changes) produce
//! no line; actions the recorder never emits are an error.

use protocol::{EventType, ParsedEvent};
use std::fmt;
use url::Url;

use crate::error::{CodegenError, Result};

/// How a statement finds its element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator<'a> {
    /// `cy.get('<selector>')`
    Get(&'a str),
    /// `cy.contains('<text>')`
    Contains(&'a str),
    /// `cy.get(':contains("<text>"):visible')`
    VisibleContains(&'a str),
}

impl<'a> Locator<'a> {
    /// Text anchors beat selectors when the recorder found them unique
    pub fn for_event(event: &'a ParsedEvent) -> Self {
        match (
            event.inner_text.as_deref(),
            event.should_use_contains,
            event.should_use_get_contains,
        ) {
            (Some(text), true, _) => Locator::Contains(text),
            (Some(text), false, true) => Locator::VisibleContains(text),
            _ => Locator::Get(&event.selector),
        }
    }
}

impl fmt::Display for Locator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Get(selector) => write!(f, "get('{}')", escape_single_quoted(selector)),
            Locator::Contains(text) => write!(f, "contains('{}')", escape_single_quoted(text)),
            Locator::VisibleContains(text) => {
                let selector = format!(":contains(\"{}\"):visible", text.replace('"', "\\\""));
                write!(f, "get('{}')", escape_single_quoted(&selector))
            }
        }
    }
}

/// Keys replayed individually; everything else arrives through the
/// following change event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialKey {
    Backspace,
    Escape,
    ArrowUp,
    ArrowRight,
    ArrowDown,
    ArrowLeft,
}

impl SpecialKey {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Backspace" => Some(SpecialKey::Backspace),
            "Escape" => Some(SpecialKey::Escape),
            "ArrowUp" => Some(SpecialKey::ArrowUp),
            "ArrowRight" => Some(SpecialKey::ArrowRight),
            "ArrowDown" => Some(SpecialKey::ArrowDown),
            "ArrowLeft" => Some(SpecialKey::ArrowLeft),
            _ => None,
        }
    }

    /// `cy.type()` key sequence
    pub fn token(&self) -> &'static str {
        match self {
            SpecialKey::Backspace => "{backspace}",
            SpecialKey::Escape => "{esc}",
            SpecialKey::ArrowUp => "{uparrow}",
            SpecialKey::ArrowRight => "{rightarrow}",
            SpecialKey::ArrowDown => "{downarrow}",
            SpecialKey::ArrowLeft => "{leftarrow}",
        }
    }
}

/// Statement for one recorded event, `None` when there is nothing to replay
pub fn create_block(event: &ParsedEvent) -> Result<Option<String>> {
    let action = event
        .event_type()
        .map_err(|_| CodegenError::UnhandledEvent(event.action.clone()))?;
    let locator = Locator::for_event(event);

    let line = match action {
        EventType::Click => Some(format!("cy.{}.click();", locator)),
        EventType::DblClick => Some(format!("cy.{}.dblclick();", locator)),
        EventType::Submit => Some(format!("cy.{}.submit();", locator)),
        EventType::Change => handle_change(event, locator),
        EventType::KeyDown => handle_keydown(event, locator),
    };

    if line.is_none() {
        tracing::debug!("No statement for {} on {}", action, event.selector);
    }
    Ok(line)
}

/// Page load command that opens a recording
pub fn create_visit(url: &str) -> String {
    format!("cy.visit('{}');", escape_single_quoted(url))
}

/// Assertion that the browser is on `url`, ignoring query and fragment
pub fn create_url(url: &str) -> Result<String> {
    let mut parsed = Url::parse(url).map_err(|source| CodegenError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;

    let location = if parsed.origin().is_tuple() {
        format!("{}{}", parsed.origin().ascii_serialization(), parsed.path())
    } else {
        // data:, about: and friends have no origin to speak of
        parsed.set_query(None);
        parsed.set_fragment(None);
        parsed.to_string()
    };

    Ok(format!(
        "cy.url().should('contains', '{}');",
        escape_single_quoted(&location)
    ))
}

fn handle_change(event: &ParsedEvent, locator: Locator<'_>) -> Option<String> {
    if matches!(event.input_type.as_deref(), Some("checkbox") | Some("radio")) {
        return None;
    }
    let value = event.value.as_deref().unwrap_or("");
    Some(format!("cy.{}.type('{}');", locator, escape_single_quoted(value)))
}

fn handle_keydown(event: &ParsedEvent, locator: Locator<'_>) -> Option<String> {
    let key = SpecialKey::from_key(event.key.as_deref()?)?;
    Some(format!("cy.{}.type('{}');", locator, key.token()))
}

/// Make `s` safe inside a single-quoted JavaScript string literal
fn escape_single_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            // pre-ES2019 engines end string literals here too
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out
}
