//! Unique selector synthesis
//!
//! Walks from the target towards the root, trying the cheapest step for each
//! level first (id, preferred attributes, classes, tag). The first path that
//! matches exactly one element in the document wins. Levels that stay
//! ambiguous are pinned with `:nth-child`.

use serde::{Deserialize, Serialize};

use crate::arena::DomArena;
use crate::error::Result;
use crate::selector::{is_valid_ident, nth_child_index, Selector, SelectorStep};
use crate::types::NodeId;

/// Attributes test authors put on elements to give them stable locators,
/// highest priority first
pub const TEST_ID_ATTRIBUTES: &[&str] = &["data-cy", "data-test", "data-testid"];

/// Finder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinderConfig {
    /// Attribute names worth using as a selector step, in priority order
    pub preferred_attributes: Vec<String>,
    pub use_ids: bool,
    pub use_classes: bool,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            preferred_attributes: TEST_ID_ATTRIBUTES.iter().map(|s| s.to_string()).collect(),
            use_ids: true,
            use_classes: true,
        }
    }
}

pub struct SelectorFinder {
    config: FinderConfig,
}

impl SelectorFinder {
    pub fn new() -> Self {
        Self::with_config(FinderConfig::default())
    }

    pub fn with_config(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Build a selector that matches `target` and nothing else
    pub fn find(&self, arena: &DomArena, target: NodeId) -> Result<Selector> {
        arena.element(target)?;

        let mut path: Vec<SelectorStep> = Vec::new();
        let mut levels: Vec<NodeId> = Vec::new();
        let mut current = Some(target);

        while let Some(node_id) = current {
            let candidates = self.candidates(arena, node_id)?;

            for candidate in &candidates {
                let mut steps = Vec::with_capacity(path.len() + 1);
                steps.push(candidate.clone());
                steps.extend(path.iter().cloned());
                let trial = Selector::new(steps);
                if trial.is_unique(arena) {
                    return Ok(trial);
                }
            }

            // The tag candidate is always last, so there is at least one.
            let mut step = candidates.into_iter().next().unwrap_or_default();
            if shares_with_sibling(arena, node_id, &step) {
                step.nth_child = nth_child_index(arena, node_id);
            }
            path.insert(0, step);
            levels.insert(0, node_id);

            let trial = Selector::new(path.clone());
            if trial.is_unique(arena) {
                return Ok(trial);
            }

            current = arena.parent_element(node_id);
        }

        // Still ambiguous at the top: pin every level and anchor at the root.
        for (step, &node_id) in path.iter_mut().zip(levels.iter()) {
            step.nth_child = nth_child_index(arena, node_id);
        }
        if let Some(top) = path.first_mut() {
            top.root = true;
        }
        Ok(Selector::new(path))
    }

    /// Steps that describe the node on its own, most specific first
    fn candidates(&self, arena: &DomArena, node_id: NodeId) -> Result<Vec<SelectorStep>> {
        let node = arena.element(node_id)?;
        let mut out = Vec::new();

        if self.config.use_ids {
            if let Some(id) = node.attr("id").filter(|id| is_valid_ident(id)) {
                out.push(SelectorStep::id(id));
            }
        }

        for name in &self.config.preferred_attributes {
            if let Some(value) = node.attr(name) {
                out.push(SelectorStep::attr(name, value, true));
            }
        }

        if self.config.use_classes {
            for class in node.classes().filter(|c| is_valid_ident(c)) {
                out.push(SelectorStep::class(class));
            }
        }

        out.push(SelectorStep::tag(&node.node_name));
        Ok(out)
    }
}

impl Default for SelectorFinder {
    fn default() -> Self {
        Self::new()
    }
}

fn shares_with_sibling(arena: &DomArena, node_id: NodeId, step: &SelectorStep) -> bool {
    let Some(parent) = arena.get(node_id).ok().and_then(|n| n.parent_id) else {
        return false;
    };
    arena
        .element_children(parent)
        .map(|siblings| {
            siblings
                .into_iter()
                .any(|id| id != node_id && step.matches(arena, id))
        })
        .unwrap_or(false)
}
