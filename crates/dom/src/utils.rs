//! Utility functions for DOM processing

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::{DomNode, NodeId, NodeType};

/// Cap text length for log output
pub fn cap_text_length(text: &str, max_len: usize) -> String {
    match text.char_indices().nth(max_len) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}...", &text[..cut]),
    }
}

/// Check if element is visible according to its own CSS and attributes
pub fn is_element_visible_by_css(node: &DomNode) -> bool {
    if !is_displayed(node) {
        return false;
    }

    if node.style("visibility") == Some("hidden") {
        return false;
    }

    if let Some(opacity) = node.style("opacity") {
        if let Ok(opacity_val) = opacity.parse::<f64>() {
            if opacity_val <= 0.0 {
                return false;
            }
        }
    }

    true
}

/// `display: none` and the `hidden` attribute remove the whole subtree from layout
fn is_displayed(node: &DomNode) -> bool {
    node.style("display") != Some("none") && !node.has_attr("hidden")
}

/// Check whether the element and all of its ancestors take part in layout
pub fn is_rendered(arena: &DomArena, node_id: NodeId) -> bool {
    let Ok(node) = arena.get(node_id) else {
        return false;
    };
    if node.is_element() && !is_displayed(node) {
        return false;
    }
    arena.ancestors(node_id).all(|id| {
        arena
            .get(id)
            .map(|a| !a.is_element() || is_displayed(a))
            .unwrap_or(false)
    })
}

/// Visibility as a user sees it: rendered, not hidden by style, and with a
/// non-empty layout box. Elements without snapshot bounds are not visible.
pub fn is_visible(arena: &DomArena, node_id: NodeId) -> bool {
    let Ok(node) = arena.get(node_id) else {
        return false;
    };
    node.is_element()
        && is_element_visible_by_css(node)
        && is_rendered(arena, node_id)
        && node.bounds().map(|b| b.has_layout()).unwrap_or(false)
}

/// Get all text content from node and its children
pub fn get_text_content(arena: &DomArena, node_id: NodeId) -> Result<String> {
    let mut text = String::new();

    arena.traverse_df(node_id, |node| {
        if node.node_type == NodeType::Text {
            text.push_str(&node.node_value);
        }
        Ok(())
    })?;

    Ok(text.trim().to_string())
}

/// Rendered text of an element, the way `HTMLElement.innerText` reports it
///
/// Hidden subtrees are skipped, whitespace runs collapse to one space and
/// `<br>` breaks lines. An element that is not rendered at all reports its
/// plain text content instead.
pub fn inner_text(arena: &DomArena, node_id: NodeId) -> Result<String> {
    arena.element(node_id)?;
    if !is_rendered(arena, node_id) {
        return get_text_content(arena, node_id);
    }

    let mut raw = String::new();
    let mut stack: Vec<NodeId> = arena.get(node_id)?.children_ids.iter().rev().copied().collect();

    while let Some(id) = stack.pop() {
        let node = arena.get(id)?;
        match node.node_type {
            // Source newlines are plain whitespace; only <br> breaks a line
            NodeType::Text => raw.push_str(&node.node_value.replace(['\n', '\r'], " ")),
            NodeType::Element => {
                if node.is_tag("br") {
                    raw.push('\n');
                    continue;
                }
                if NON_TEXT_TAGS.iter().any(|tag| node.is_tag(tag))
                    || !is_element_visible_by_css(node)
                {
                    continue;
                }
                stack.extend(node.children_ids.iter().rev().copied());
            }
            _ => {}
        }
    }

    let lines: Vec<String> = raw
        .split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();

    Ok(lines.join("\n").trim().to_string())
}

/// Elements whose content never shows up as text
const NON_TEXT_TAGS: &[&str] = &["script", "style", "template", "noscript", "head"];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DomRect;

    fn page() -> (DomArena, NodeId) {
        let mut arena = DomArena::document();
        let root = arena.root_id().unwrap();
        let html = arena.append_child(root, DomNode::element("html")).unwrap();
        let body = arena
            .append_child(
                html,
                DomNode::element("body").with_bounds(DomRect::new(0.0, 0.0, 800.0, 600.0)),
            )
            .unwrap();
        (arena, body)
    }

    #[test]
    fn test_cap_text_length() {
        assert_eq!(cap_text_length("hello", 10), "hello");
        assert_eq!(cap_text_length("hello world", 5), "hello...");
        assert_eq!(cap_text_length("héllo", 2), "hé...");
    }

    #[test]
    fn test_visibility_rules() {
        let (mut arena, body) = page();
        let sized = DomRect::new(0.0, 0.0, 10.0, 10.0);

        let shown = arena
            .append_child(body, DomNode::element("div").with_bounds(sized))
            .unwrap();
        let no_bounds = arena.append_child(body, DomNode::element("div")).unwrap();
        let flat = arena
            .append_child(body, DomNode::element("div").with_bounds(DomRect::zero()))
            .unwrap();
        let hidden_attr = arena
            .append_child(body, DomNode::element("div").with_attr("hidden", "").with_bounds(sized))
            .unwrap();
        let collapsed = arena
            .append_child(body, DomNode::element("div").with_style("display", "none"))
            .unwrap();
        let inside_collapsed = arena
            .append_child(collapsed, DomNode::element("span").with_bounds(sized))
            .unwrap();
        let transparent = arena
            .append_child(
                body,
                DomNode::element("div")
                    .with_style("opacity", "0")
                    .with_bounds(sized),
            )
            .unwrap();

        assert!(is_visible(&arena, shown));
        assert!(!is_visible(&arena, no_bounds));
        assert!(!is_visible(&arena, flat));
        assert!(!is_visible(&arena, hidden_attr));
        assert!(!is_visible(&arena, inside_collapsed));
        assert!(!is_visible(&arena, transparent));
        assert!(!is_rendered(&arena, inside_collapsed));
    }

    #[test]
    fn test_inner_text_collapses_and_skips_hidden() {
        let (mut arena, body) = page();
        let button = arena.append_child(body, DomNode::element("button")).unwrap();
        arena.append_child(button, DomNode::text("  Save \n  ")).unwrap();
        let strong = arena.append_child(button, DomNode::element("strong")).unwrap();
        arena.append_child(strong, DomNode::text("draft")).unwrap();
        let hidden = arena
            .append_child(button, DomNode::element("span").with_style("display", "none"))
            .unwrap();
        arena.append_child(hidden, DomNode::text("secret")).unwrap();
        arena.append_child(button, DomNode::element("br")).unwrap();
        arena.append_child(button, DomNode::text("now")).unwrap();

        assert_eq!(inner_text(&arena, button).unwrap(), "Save draft\nnow");
    }

    #[test]
    fn test_inner_text_of_unrendered_element_is_text_content() {
        let (mut arena, body) = page();
        let menu = arena
            .append_child(body, DomNode::element("ul").with_style("display", "none"))
            .unwrap();
        let item = arena.append_child(menu, DomNode::element("li")).unwrap();
        arena.append_child(item, DomNode::text(" Logout ")).unwrap();

        assert_eq!(inner_text(&arena, menu).unwrap(), "Logout");
    }
}
