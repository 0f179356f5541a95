//! Event Parser - turns a DOM event into a [`ParsedEvent`]
//!
//! Locator preference:
//! 1. A test-id attribute on the target itself → `[attr=value]`
//! 2. Otherwise a synthesized unique selector that still prefers those
//!    attributes on the way up
//!
//! On top of that, the target's rendered text is checked as a text anchor:
//! unique in the document, or unique among visible elements.

use dom::{utils, DomArena, NodeId, Selector, SelectorFinder, TextMatch};
use protocol::{EventType, ParsedEvent};

use crate::config::RecorderConfig;
use crate::error::Result;
use crate::events::DomEvent;
use crate::page::Page;

pub struct EventParser {
    test_id_attributes: Vec<String>,
    finder: SelectorFinder,
}

impl EventParser {
    pub fn new(config: &RecorderConfig) -> Self {
        Self {
            test_id_attributes: config.test_id_attributes.clone(),
            finder: SelectorFinder::with_config(config.finder_config()),
        }
    }

    pub fn parse(&self, page: &Page, event: &DomEvent) -> Result<ParsedEvent> {
        let document = page.document();
        let target = document.element(event.target)?;

        let selector = self.selector_for(document, event.target)?;

        let inner_text = utils::inner_text(document, event.target)?;
        let inner_text = (!inner_text.is_empty()).then_some(inner_text);
        let text_match = match &inner_text {
            Some(text) => TextMatch::resolve(document, text)?,
            None => TextMatch::Ambiguous,
        };

        let tag = target.node_name.to_ascii_uppercase();
        let input_type = (tag == "INPUT").then(|| input_type(target.attr("type")));
        let key = if event.kind() == Some(EventType::KeyDown) {
            event.key.clone()
        } else {
            None
        };

        Ok(ParsedEvent {
            selector,
            inner_text,
            should_use_contains: text_match == TextMatch::Unique,
            should_use_get_contains: text_match == TextMatch::UniqueVisible,
            action: event.event_type.clone(),
            value: target.form_value().map(String::from),
            href: target.attr("href").map(|href| page.resolve_href(href)),
            id: target.attr("id").map(String::from),
            input_type,
            key,
            tag,
        })
    }

    /// Locator for the target: test-id shorthand first, synthesized path otherwise
    pub fn selector_for(&self, document: &DomArena, target: NodeId) -> Result<String> {
        let node = document.element(target)?;

        for name in &self.test_id_attributes {
            if let Some(value) = node.attr(name) {
                return Ok(Selector::attribute(name, value).to_string());
            }
        }

        Ok(self.finder.find(document, target)?.to_string())
    }
}

/// `type` values an `<input>` understands
const INPUT_TYPES: &[&str] = &[
    "button", "checkbox", "color", "date", "datetime-local", "email", "file", "hidden", "image",
    "month", "number", "password", "radio", "range", "reset", "search", "submit", "tel", "text",
    "time", "url", "week",
];

/// Reflected `HTMLInputElement.type`: case-insensitive, unknown values read as `text`
fn input_type(attr: Option<&str>) -> String {
    attr.and_then(|value| {
        INPUT_TYPES
            .iter()
            .find(|known| known.eq_ignore_ascii_case(value))
    })
    .copied()
    .unwrap_or("text")
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::{DomNode, DomRect};

    const SIZE: DomRect = DomRect {
        x: 0.0,
        y: 0.0,
        width: 120.0,
        height: 24.0,
    };

    struct Fixture {
        page: Page,
        body: NodeId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut document = DomArena::document();
            let root = document.root_id().unwrap();
            let html = document.append_child(root, DomNode::element("HTML")).unwrap();
            let body = document
                .append_child(html, DomNode::element("BODY").with_bounds(SIZE))
                .unwrap();
            Self {
                page: Page::new("https://example.com/app/login", document).unwrap(),
                body,
            }
        }

        fn add(&mut self, parent: NodeId, node: DomNode) -> NodeId {
            self.page.document_mut().append_child(parent, node).unwrap()
        }

        fn add_text(&mut self, parent: NodeId, text: &str) {
            self.add(parent, DomNode::text(text));
        }

        fn parse(&self, event: DomEvent) -> ParsedEvent {
            EventParser::new(&RecorderConfig::default())
                .parse(&self.page, &event)
                .unwrap()
        }
    }

    #[test]
    fn test_test_id_priority() {
        let mut fx = Fixture::new();
        let body = fx.body;
        let all_three = fx.add(
            body,
            DomNode::element("BUTTON")
                .with_attr("data-testid", "c")
                .with_attr("data-test", "b")
                .with_attr("data-cy", "a"),
        );
        let two = fx.add(
            body,
            DomNode::element("BUTTON")
                .with_attr("data-testid", "c")
                .with_attr("data-test", "b"),
        );
        let one = fx.add(body, DomNode::element("BUTTON").with_attr("data-testid", "c"));

        let selector_of = |target| fx.parse(DomEvent::trusted(EventType::Click, target)).selector;
        assert_eq!(selector_of(all_three), "[data-cy=a]");
        assert_eq!(selector_of(two), "[data-test=b]");
        assert_eq!(selector_of(one), "[data-testid=c]");
    }

    #[test]
    fn test_synthesized_selector_resolves_to_target() {
        let mut fx = Fixture::new();
        let body = fx.body;
        let form = fx.add(body, DomNode::element("FORM").with_attr("data-cy", "login"));
        fx.add(form, DomNode::element("INPUT").with_attr("name", "user"));
        let password = fx.add(form, DomNode::element("INPUT").with_attr("type", "PASSWORD"));

        let event = fx.parse(DomEvent::trusted(EventType::Change, password));
        assert_eq!(event.selector, "input:nth-child(2)");
        let selector = Selector::parse(&event.selector).unwrap();
        assert_eq!(selector.query_all(fx.page.document()), vec![password]);

        assert_eq!(event.tag, "INPUT");
        assert_eq!(event.input_type.as_deref(), Some("password"));
        assert_eq!(event.value.as_deref(), Some(""));
        assert_eq!(event.action, "change");
    }

    #[test]
    fn test_unique_text_match() {
        let mut fx = Fixture::new();
        let body = fx.body;
        let button = fx.add(body, DomNode::element("BUTTON").with_bounds(SIZE));
        fx.add_text(button, "Sign in");
        let other = fx.add(body, DomNode::element("BUTTON").with_bounds(SIZE));
        fx.add_text(other, "Register");

        let event = fx.parse(DomEvent::trusted(EventType::Click, button));
        assert_eq!(event.inner_text.as_deref(), Some("Sign in"));
        assert!(event.should_use_contains);
        assert!(!event.should_use_get_contains);
    }

    #[test]
    fn test_visible_text_match() {
        let mut fx = Fixture::new();
        let body = fx.body;
        let hidden_menu = fx.add(body, DomNode::element("UL").with_style("display", "none"));
        let hidden_item = fx.add(hidden_menu, DomNode::element("LI"));
        fx.add_text(hidden_item, "Settings");
        let link = fx.add(
            body,
            DomNode::element("A")
                .with_attr("href", "settings")
                .with_bounds(SIZE),
        );
        fx.add_text(link, "Settings");

        let event = fx.parse(DomEvent::trusted(EventType::Click, link));
        assert!(!event.should_use_contains);
        assert!(event.should_use_get_contains);
        assert_eq!(event.href.as_deref(), Some("https://example.com/app/settings"));
        assert_eq!(event.value, None);
    }

    #[test]
    fn test_ambiguous_text() {
        let mut fx = Fixture::new();
        let body = fx.body;
        let first = fx.add(body, DomNode::element("BUTTON").with_bounds(SIZE));
        fx.add_text(first, "Add");
        let second = fx.add(body, DomNode::element("BUTTON").with_bounds(SIZE));
        fx.add_text(second, "Add");

        let event = fx.parse(DomEvent::trusted(EventType::Click, second));
        assert_eq!(event.inner_text.as_deref(), Some("Add"));
        assert!(!event.should_use_contains);
        assert!(!event.should_use_get_contains);
    }

    #[test]
    fn test_empty_text_skips_matching() {
        let mut fx = Fixture::new();
        let body = fx.body;
        let input = fx.add(
            body,
            DomNode::element("INPUT")
                .with_attr("id", "email")
                .with_input_value("a@b.c"),
        );

        let event = fx.parse(DomEvent::trusted(EventType::KeyDown, input).with_key("Enter"));
        assert_eq!(event.inner_text, None);
        assert!(!event.should_use_contains && !event.should_use_get_contains);
        assert_eq!(event.selector, "#email");
        assert_eq!(event.id.as_deref(), Some("email"));
        assert_eq!(event.input_type.as_deref(), Some("text"));
        assert_eq!(event.value.as_deref(), Some("a@b.c"));
        assert_eq!(event.key.as_deref(), Some("Enter"));
    }

    #[test]
    fn test_input_type_reflects_browser() {
        let mut fx = Fixture::new();
        let body = fx.body;
        let unknown = fx.add(body, DomNode::element("INPUT").with_attr("type", "foo"));
        let upper = fx.add(body, DomNode::element("INPUT").with_attr("type", "CheckBox"));
        let missing = fx.add(body, DomNode::element("INPUT"));
        let button = fx.add(body, DomNode::element("BUTTON").with_attr("type", "submit"));

        let type_of = |target| fx.parse(DomEvent::trusted(EventType::Click, target)).input_type;
        assert_eq!(type_of(unknown).as_deref(), Some("text"));
        assert_eq!(type_of(upper).as_deref(), Some("checkbox"));
        assert_eq!(type_of(missing).as_deref(), Some("text"));
        assert_eq!(type_of(button), None);
    }

    #[test]
    fn test_key_only_for_keydown() {
        let mut fx = Fixture::new();
        let body = fx.body;
        let button = fx.add(body, DomNode::element("BUTTON").with_attr("data-cy", "go"));

        let event = fx.parse(DomEvent::trusted(EventType::Click, button).with_key("Enter"));
        assert_eq!(event.key, None);
        assert_eq!(event.input_type, None);
        assert_eq!(event.href, None);
        assert_eq!(event.id, None);
    }

    #[test]
    fn test_non_element_target_is_an_error() {
        let mut fx = Fixture::new();
        let body = fx.body;
        let text = fx.add(body, DomNode::text("stray"));

        let parser = EventParser::new(&RecorderConfig::default());
        assert!(parser
            .parse(&fx.page, &DomEvent::trusted(EventType::Click, text))
            .is_err());
    }
}
