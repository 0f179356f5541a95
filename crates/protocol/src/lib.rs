//! Wire types shared by the recorder and the script generator
//!
//! Keep them minimal: one record per recorded interaction, serialized the
//! way the background side expects it (camelCase JSON).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Unknown event type: {0}")]
    UnknownEventType(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;

/// DOM event categories the recorder listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Click,
    DblClick,
    Change,
    KeyDown,
    Submit,
}

impl EventType {
    pub const ALL: [EventType; 5] = [
        EventType::Click,
        EventType::DblClick,
        EventType::Change,
        EventType::KeyDown,
        EventType::Submit,
    ];

    /// DOM event name
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Click => "click",
            EventType::DblClick => "dblclick",
            EventType::Change => "change",
            EventType::KeyDown => "keydown",
            EventType::Submit => "submit",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        EventType::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| ProtocolError::UnknownEventType(s.to_string()))
    }
}

/// One recorded user interaction
///
/// `action` stays a plain string on the wire: records may come from a
/// transport we do not control, and the generator is the one that rejects
/// unknown actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedEvent {
    pub selector: String,
    #[serde(default)]
    pub inner_text: Option<String>,
    /// The text alone identifies exactly one element
    #[serde(default)]
    pub should_use_contains: bool,
    /// The text identifies exactly one visible element
    #[serde(default)]
    pub should_use_get_contains: bool,
    pub action: String,
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl ParsedEvent {
    /// Bare record with only the required fields set
    pub fn new(selector: impl Into<String>, action: EventType, tag: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            inner_text: None,
            should_use_contains: false,
            should_use_get_contains: false,
            action: action.as_str().to_string(),
            tag: tag.into(),
            value: None,
            href: None,
            id: None,
            input_type: None,
            key: None,
        }
    }

    pub fn event_type(&self) -> Result<EventType> {
        self.action.parse()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_names() {
        for event in EventType::ALL {
            assert_eq!(event.as_str().parse::<EventType>().unwrap(), event);
            assert_eq!(
                serde_json::to_string(&event).unwrap(),
                format!("\"{}\"", event.as_str())
            );
        }
        assert!(matches!(
            "mouseover".parse::<EventType>(),
            Err(ProtocolError::UnknownEventType(name)) if name == "mouseover"
        ));
    }

    #[test]
    fn test_wire_shape() {
        let mut event = ParsedEvent::new("[data-cy=email]", EventType::Change, "INPUT");
        event.value = Some("me@example.com".to_string());
        event.input_type = Some("email".to_string());

        let json: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "selector": "[data-cy=email]",
                "innerText": null,
                "shouldUseContains": false,
                "shouldUseGetContains": false,
                "action": "change",
                "tag": "INPUT",
                "value": "me@example.com",
                "inputType": "email"
            })
        );
    }

    #[test]
    fn test_unknown_action_survives_transport() {
        let event = ParsedEvent::from_json(
            r##"{ "selector": "#menu", "action": "contextmenu", "tag": "DIV" }"##,
        )
        .unwrap();
        assert_eq!(event.action, "contextmenu");
        assert!(event.event_type().is_err());
        assert_eq!(event.inner_text, None);
        assert!(!event.should_use_contains);
    }
}
