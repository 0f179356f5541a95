//! Core type definitions for the page model
//!
//! Key design principles:
//! 1. Use u32 for indices (4 bytes vs 8 bytes pointer)
//! 2. Use SmallVec for small arrays (avoid heap allocation)
//! 3. Use Option<Box<T>> for large optional fields (reduce struct size)

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Node identifier (index into arena)
/// u32 allows 4 billion nodes, enough for any webpage
pub type NodeId = u32;

/// Node type matching DOM specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Attribute = 2,
    Text = 3,
    CdataSection = 4,
    EntityReference = 5,
    Entity = 6,
    ProcessingInstruction = 7,
    Comment = 8,
    Document = 9,
    DocumentType = 10,
    DocumentFragment = 11,
    Notation = 12,
}

impl NodeType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(NodeType::Element),
            2 => Some(NodeType::Attribute),
            3 => Some(NodeType::Text),
            4 => Some(NodeType::CdataSection),
            5 => Some(NodeType::EntityReference),
            6 => Some(NodeType::Entity),
            7 => Some(NodeType::ProcessingInstruction),
            8 => Some(NodeType::Comment),
            9 => Some(NodeType::Document),
            10 => Some(NodeType::DocumentType),
            11 => Some(NodeType::DocumentFragment),
            12 => Some(NodeType::Notation),
            _ => None,
        }
    }
}

/// Rectangle with coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DomRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// An element is laid out when either dimension is non-zero
    pub fn has_layout(&self) -> bool {
        self.width > 0.0 || self.height > 0.0
    }
}

/// Rendering data captured alongside the DOM tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotNode {
    /// Document coordinates (top-left of page, ignores scroll)
    pub bounds: Option<DomRect>,
    /// Computed CSS styles
    pub computed_styles: Option<HashMap<String, String>>,
}

impl SnapshotNode {
    pub fn style(&self, name: &str) -> Option<&str> {
        self.computed_styles
            .as_ref()
            .and_then(|styles| styles.get(name))
            .map(|s| s.as_str())
    }
}

/// The main DOM tree node structure
///
/// `node_id` is the identifier the node came with (CDP `nodeId`);
/// `parent_id` and `children_ids` are arena indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomNode {
    pub node_id: NodeId,
    pub backend_node_id: u32,
    pub node_type: NodeType,

    // Navigation indices
    pub parent_id: Option<NodeId>,
    pub children_ids: SmallVec<[NodeId; 4]>, // Most nodes have <4 children

    /// Frame document of an iframe, kept out of `children_ids`: the page
    /// document cannot query into another frame
    pub content_document_id: Option<NodeId>,
    /// Attached shadow roots, likewise outside light-DOM traversal
    pub shadow_root_ids: Option<SmallVec<[NodeId; 2]>>,

    pub node_name: String,
    pub node_value: String,
    pub attributes: HashMap<String, String>,

    /// Live form value (`HTMLInputElement.value`), which can differ from
    /// the `value` attribute once the user has typed.
    pub input_value: Option<String>,

    // State
    pub is_visible: Option<bool>,

    pub snapshot_node: Option<Box<SnapshotNode>>,
}

impl DomNode {
    /// Create a new node with required fields
    pub fn new(
        node_id: NodeId,
        backend_node_id: u32,
        node_type: NodeType,
        node_name: String,
    ) -> Self {
        Self {
            node_id,
            backend_node_id,
            node_type,
            node_name,
            node_value: String::new(),
            attributes: HashMap::new(),
            input_value: None,
            parent_id: None,
            children_ids: SmallVec::new(),
            content_document_id: None,
            shadow_root_ids: None,
            is_visible: None,
            snapshot_node: None,
        }
    }

    /// Element node shorthand, mostly for building pages by hand
    pub fn element(tag: &str) -> Self {
        Self::new(0, 0, NodeType::Element, tag.to_string())
    }

    /// Text node shorthand
    pub fn text(value: &str) -> Self {
        let mut node = Self::new(0, 0, NodeType::Text, "#text".to_string());
        node.node_value = value.to_string();
        node
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_bounds(mut self, bounds: DomRect) -> Self {
        self.snapshot_node
            .get_or_insert_with(Default::default)
            .bounds = Some(bounds);
        self
    }

    pub fn with_style(mut self, name: &str, value: &str) -> Self {
        self.snapshot_node
            .get_or_insert_with(Default::default)
            .computed_styles
            .get_or_insert_with(HashMap::new)
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_input_value(mut self, value: &str) -> Self {
        self.input_value = Some(value.to_string());
        self
    }

    /// Tag comparison is case-insensitive (CDP reports HTML tags upper-cased)
    pub fn is_tag(&self, tag: &str) -> bool {
        self.is_element() && self.node_name.eq_ignore_ascii_case(tag)
    }

    /// Check if node is an element
    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    /// Check if node is text
    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Get attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Whitespace-separated `class` attribute entries
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }

    pub fn style(&self, name: &str) -> Option<&str> {
        self.snapshot_node.as_ref().and_then(|s| s.style(name))
    }

    pub fn bounds(&self) -> Option<&DomRect> {
        self.snapshot_node.as_ref().and_then(|s| s.bounds.as_ref())
    }

    /// Form value as the page would report it: the live value when known,
    /// otherwise the `value` attribute for form controls. `None` for elements
    /// that have no value property at all.
    pub fn form_value(&self) -> Option<&str> {
        if let Some(value) = &self.input_value {
            return Some(value);
        }
        if FORM_VALUE_TAGS.iter().any(|tag| self.is_tag(tag)) {
            Some(self.attr("value").unwrap_or(""))
        } else {
            None
        }
    }
}

/// Elements that expose a `.value` property
pub const FORM_VALUE_TAGS: &[&str] = &[
    "input", "textarea", "select", "option", "button", "output", "data", "li", "meter",
    "progress", "param",
];
