//! Arena-based DOM tree storage
//!
//! Nodes live in a single `Vec`, addressed by 4-byte indices. Parent and
//! child links are indices too, so walking the tree never touches `Rc`
//! or recursion.
//!
//! ```text
//! Arena: Vec<DomNode>
//!        [Node0][Node1][Node2]...
//!         ↑ 4-byte index, not 8-byte pointer
//! ```

use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId, NodeType};
use ahash::AHashMap;

/// Arena allocator for DOM nodes
///
/// - Single Vec<DomNode> for sequential allocation
/// - HashMap for backend_node_id → NodeId lookup (CDP uses backend IDs)
#[derive(Debug, Clone)]
pub struct DomArena {
    nodes: Vec<DomNode>,

    backend_id_map: AHashMap<u32, NodeId>,

    root_id: Option<NodeId>,
}

impl DomArena {
    /// Create a new empty arena
    pub fn new() -> Self {
        Self::with_capacity(1024) // Pre-allocate for typical page
    }

    /// Create arena with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            backend_id_map: AHashMap::with_capacity(capacity),
            root_id: None,
        }
    }

    /// Build an arena holding just a `#document` root
    pub fn document() -> Self {
        let mut arena = Self::new();
        let root = arena.add_node(DomNode::new(
            0,
            0,
            NodeType::Document,
            "#document".to_string(),
        ));
        arena.root_id = Some(root);
        arena
    }

    /// Add a node to the arena, returns its ID
    pub fn add_node(&mut self, node: DomNode) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        if node.backend_node_id != 0 {
            self.backend_id_map.insert(node.backend_node_id, node_id);
        }
        self.nodes.push(node);
        node_id
    }

    /// Add a node and link it as the last child of `parent_id`
    pub fn append_child(&mut self, parent_id: NodeId, mut node: DomNode) -> Result<NodeId> {
        self.get(parent_id)?;
        node.parent_id = Some(parent_id);
        let child_id = self.add_node(node);
        self.get_mut(parent_id)?.children_ids.push(child_id);
        Ok(child_id)
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        self.nodes
            .get(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node by ID (mutable)
    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.nodes
            .get_mut(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get element by ID, failing for text/comment/document nodes
    pub fn element(&self, node_id: NodeId) -> Result<&DomNode> {
        let node = self.get(node_id)?;
        if node.is_element() {
            Ok(node)
        } else {
            Err(DomError::NotAnElement(node_id))
        }
    }

    /// Get node by backend node ID (from CDP)
    pub fn get_by_backend_id(&self, backend_id: u32) -> Result<&DomNode> {
        let node_id = self
            .backend_id_map
            .get(&backend_id)
            .ok_or(DomError::NodeNotFound(backend_id))?;
        self.get(*node_id)
    }

    /// Get node ID by backend node ID
    pub fn get_node_id_by_backend(&self, backend_id: u32) -> Option<NodeId> {
        self.backend_id_map.get(&backend_id).copied()
    }

    /// Set root node
    pub fn set_root(&mut self, node_id: NodeId) -> Result<()> {
        self.get(node_id)?;
        self.root_id = Some(node_id);
        Ok(())
    }

    /// Get root node ID
    pub fn root_id(&self) -> Option<NodeId> {
        self.root_id
    }

    /// Get root node
    pub fn root(&self) -> Result<&DomNode> {
        let root_id = self
            .root_id
            .ok_or_else(|| DomError::CdpError("No root node set".to_string()))?;
        self.get(root_id)
    }

    /// Total number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterator over all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| i as NodeId)
    }

    /// Element children only, in document order
    pub fn element_children(&self, node_id: NodeId) -> Result<Vec<NodeId>> {
        let node = self.get(node_id)?;
        Ok(node
            .children_ids
            .iter()
            .copied()
            .filter(|&id| self.get(id).map(|c| c.is_element()).unwrap_or(false))
            .collect())
    }

    /// Get parent of a node
    pub fn parent(&self, node_id: NodeId) -> Result<Option<&DomNode>> {
        let node = self.get(node_id)?;
        match node.parent_id {
            Some(parent_id) => Ok(Some(self.get(parent_id)?)),
            None => Ok(None),
        }
    }

    /// Parent, but only when it is an element
    pub fn parent_element(&self, node_id: NodeId) -> Option<NodeId> {
        let parent_id = self.get(node_id).ok()?.parent_id?;
        self.get(parent_id)
            .ok()
            .filter(|p| p.is_element())
            .map(|_| parent_id)
    }

    /// Ancestor IDs from the parent up to the root
    pub fn ancestors(&self, node_id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = self.get(node_id).ok().and_then(|n| n.parent_id);
        std::iter::from_fn(move || {
            let id = current?;
            current = self.get(id).ok().and_then(|n| n.parent_id);
            Some(id)
        })
    }

    /// Traverse tree depth-first (iterative, no recursion)
    pub fn traverse_df<F>(&self, start_id: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(&DomNode) -> Result<()>,
    {
        let mut stack = vec![start_id];

        while let Some(node_id) = stack.pop() {
            let node = self.get(node_id)?;
            visit(node)?;

            // Push children in reverse order (so they're visited left-to-right)
            for &child_id in node.children_ids.iter().rev() {
                stack.push(child_id);
            }
        }

        Ok(())
    }

    /// All descendant IDs of `start_id` in document order (excluding itself)
    pub fn descendants(&self, start_id: NodeId) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> =
            self.get(start_id)?.children_ids.iter().rev().copied().collect();

        while let Some(node_id) = stack.pop() {
            out.push(node_id);
            stack.extend(self.get(node_id)?.children_ids.iter().rev().copied());
        }

        Ok(out)
    }

    /// Find first node matching predicate
    pub fn find_one<F>(&self, predicate: F) -> Option<NodeId>
    where
        F: Fn(&DomNode) -> bool,
    {
        self.nodes.iter().enumerate().find_map(|(idx, node)| {
            if predicate(node) {
                Some(idx as NodeId)
            } else {
                None
            }
        })
    }

    /// The `body` element, if the page has one
    pub fn body(&self) -> Option<NodeId> {
        self.find_one(|node| node.is_tag("body"))
    }

    /// Clear arena (reuse allocation)
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.backend_id_map.clear();
        self.root_id = None;
    }
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}
