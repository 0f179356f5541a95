//! Text anchors: does a piece of text point at exactly one element?
//!
//! An element matches when one of its *direct* text children contains the
//! text as a literal substring. Only `body` descendants are searched (the
//! whole document when there is no body).

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::NodeId;
use crate::utils;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Any,
    VisibleOnly,
}

/// Outcome of the uniqueness check for a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMatch {
    /// Exactly one element in the document owns the text
    Unique,
    /// Several elements own it, but exactly one of them is visible
    UniqueVisible,
    /// No usable text anchor
    Ambiguous,
}

impl TextMatch {
    pub fn resolve(arena: &DomArena, text: &str) -> Result<Self> {
        if text.is_empty() {
            return Ok(TextMatch::Ambiguous);
        }
        if count_up_to(arena, text, Visibility::Any, 2)? == 1 {
            return Ok(TextMatch::Unique);
        }
        if count_up_to(arena, text, Visibility::VisibleOnly, 2)? == 1 {
            return Ok(TextMatch::UniqueVisible);
        }
        Ok(TextMatch::Ambiguous)
    }
}

/// Every element whose own text contains `text`, in document order
pub fn elements_with_own_text(
    arena: &DomArena,
    text: &str,
    visibility: Visibility,
) -> Result<Vec<NodeId>> {
    if text.is_empty() {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    for node_id in scope(arena)? {
        if owns_text(arena, node_id, text, visibility)? {
            out.push(node_id);
        }
    }
    Ok(out)
}

fn count_up_to(
    arena: &DomArena,
    text: &str,
    visibility: Visibility,
    limit: usize,
) -> Result<usize> {
    let mut count = 0;
    for node_id in scope(arena)? {
        if owns_text(arena, node_id, text, visibility)? {
            count += 1;
            if count >= limit {
                break;
            }
        }
    }
    Ok(count)
}

fn scope(arena: &DomArena) -> Result<Vec<NodeId>> {
    match arena.body().or_else(|| arena.root_id()) {
        Some(start) => arena.descendants(start),
        None => Ok(Vec::new()),
    }
}

fn owns_text(
    arena: &DomArena,
    node_id: NodeId,
    text: &str,
    visibility: Visibility,
) -> Result<bool> {
    let node = arena.get(node_id)?;
    if !node.is_element() {
        return Ok(false);
    }
    if visibility == Visibility::VisibleOnly {
        let visible = node
            .is_visible
            .unwrap_or_else(|| utils::is_visible(arena, node_id));
        if !visible {
            return Ok(false);
        }
    }
    for &child_id in &node.children_ids {
        let child = arena.get(child_id)?;
        if child.is_text() && child.node_value.contains(text) {
            return Ok(true);
        }
    }
    Ok(false)
}
