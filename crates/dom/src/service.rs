//! DOM Service - Main entry point for building a page model
//!
//! This handles:
//! - CDP integration (parsing `DOM.getDocument` responses)
//! - Rendering data carried alongside nodes (form values, bounds, styles)
//! - Visibility calculations

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::*;
use crate::utils;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Configuration for DOM service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomServiceConfig {
    /// Fill `is_visible` for every element after parsing
    pub compute_visibility: bool,
}

impl Default for DomServiceConfig {
    fn default() -> Self {
        Self {
            compute_visibility: true,
        }
    }
}

/// Main DOM service
pub struct DomService {
    config: DomServiceConfig,
    arena: DomArena,
}

impl DomService {
    /// Create new DOM service with default config
    pub fn new() -> Self {
        Self::with_config(DomServiceConfig::default())
    }

    /// Create DOM service with custom config
    pub fn with_config(config: DomServiceConfig) -> Self {
        Self {
            config,
            arena: DomArena::new(),
        }
    }

    /// Get reference to internal arena
    pub fn arena(&self) -> &DomArena {
        &self.arena
    }

    /// Hand the parsed tree over to its new owner
    pub fn into_arena(self) -> DomArena {
        self.arena
    }

    /// Parse CDP DOM tree response and build arena
    ///
    /// Input format matches CDP's DOM.getDocument response:
    /// ```json
    /// {
    ///   "root": {
    ///     "nodeId": 1,
    ///     "backendNodeId": 1,
    ///     "nodeType": 9,
    ///     "nodeName": "#document",
    ///     "children": [...]
    ///   }
    /// }
    /// ```
    ///
    /// Iframe `contentDocument`s and `shadowRoots` are parsed into the arena
    /// but linked from their host only through `content_document_id` and
    /// `shadow_root_ids`, never `children_ids`.
    ///
    /// Element nodes may additionally carry `value` (live form value),
    /// `bounds` (`[x, y, width, height]`) and `computedStyles` (name → value),
    /// merged from `DOMSnapshot` / `Runtime` queries.
    pub fn parse_cdp_dom_tree(&mut self, cdp_response: &Value) -> Result<NodeId> {
        let root = cdp_response
            .get("root")
            .ok_or_else(|| DomError::CdpError("Missing 'root' in CDP response".to_string()))?;

        self.arena.clear();
        let root_id = self.parse_node(root, None)?;
        self.arena.set_root(root_id)?;

        if self.config.compute_visibility {
            self.calculate_visibility()?;
        }

        Ok(root_id)
    }

    /// Parse a JSON string holding a CDP response
    pub fn parse_cdp_str(&mut self, json: &str) -> Result<NodeId> {
        let value: Value = serde_json::from_str(json)?;
        self.parse_cdp_dom_tree(&value)
    }

    /// Recursively parse a CDP node
    fn parse_node(&mut self, cdp_node: &Value, parent_id: Option<NodeId>) -> Result<NodeId> {
        let node_id = cdp_node["nodeId"]
            .as_u64()
            .ok_or_else(|| DomError::CdpError("Missing nodeId".to_string()))?
            as u32;

        let backend_node_id = cdp_node["backendNodeId"]
            .as_u64()
            .ok_or_else(|| DomError::CdpError("Missing backendNodeId".to_string()))?
            as u32;

        let node_type_val = cdp_node["nodeType"]
            .as_u64()
            .ok_or_else(|| DomError::CdpError("Missing nodeType".to_string()))?
            as u8;

        let node_type =
            NodeType::from_u8(node_type_val).ok_or_else(|| DomError::InvalidNodeType {
                expected: "valid NodeType".to_string(),
                actual: format!("{}", node_type_val),
            })?;

        let node_name = cdp_node["nodeName"].as_str().unwrap_or("").to_string();

        let node_value = cdp_node["nodeValue"].as_str().unwrap_or("").to_string();

        // Attributes come as a flat [name, value, name, value, ...] array
        let mut attributes = HashMap::new();
        if let Some(attrs) = cdp_node["attributes"].as_array() {
            for pair in attrs.chunks_exact(2) {
                if let (Some(key), Some(value)) = (pair[0].as_str(), pair[1].as_str()) {
                    attributes.insert(key.to_string(), value.to_string());
                }
            }
        }

        let mut node = DomNode::new(node_id, backend_node_id, node_type, node_name);

        node.node_value = node_value;
        node.attributes = attributes;
        node.parent_id = parent_id;
        node.input_value = cdp_node["value"].as_str().map(String::from);
        node.snapshot_node = parse_snapshot(cdp_node).map(Box::new);

        let current_node_id = self.arena.add_node(node);

        if let Some(children) = cdp_node["children"].as_array() {
            let mut child_ids = smallvec::SmallVec::new();

            for child in children {
                let child_id = self.parse_node(child, Some(current_node_id))?;
                child_ids.push(child_id);
            }

            self.arena.get_mut(current_node_id)?.children_ids = child_ids;
        }

        // Iframe document
        if let Some(content_doc) = cdp_node.get("contentDocument") {
            let doc_id = self.parse_node(content_doc, Some(current_node_id))?;
            self.arena.get_mut(current_node_id)?.content_document_id = Some(doc_id);
        }

        if let Some(shadow_roots) = cdp_node["shadowRoots"].as_array() {
            let mut shadow_ids = smallvec::SmallVec::new();

            for shadow in shadow_roots {
                let shadow_id = self.parse_node(shadow, Some(current_node_id))?;
                shadow_ids.push(shadow_id);
            }

            self.arena.get_mut(current_node_id)?.shadow_root_ids = Some(shadow_ids);
        }

        Ok(current_node_id)
    }

    /// Calculate visibility for all elements
    pub fn calculate_visibility(&mut self) -> Result<()> {
        // Get all node IDs first (to avoid borrowing issues)
        let node_ids: Vec<NodeId> = self.arena.node_ids().collect();

        for node_id in node_ids {
            if !self.arena.get(node_id)?.is_element() {
                continue;
            }
            let is_visible = utils::is_visible(&self.arena, node_id);
            self.arena.get_mut(node_id)?.is_visible = Some(is_visible);
        }

        Ok(())
    }
}

impl Default for DomService {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_snapshot(cdp_node: &Value) -> Option<SnapshotNode> {
    let bounds = cdp_node["bounds"].as_array().and_then(|b| match b.as_slice() {
        [x, y, w, h] => Some(DomRect::new(
            x.as_f64()?,
            y.as_f64()?,
            w.as_f64()?,
            h.as_f64()?,
        )),
        _ => None,
    });

    let computed_styles = cdp_node["computedStyles"].as_object().map(|styles| {
        styles
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
            .collect::<HashMap<_, _>>()
    });

    if bounds.is_none() && computed_styles.is_none() {
        return None;
    }
    Some(SnapshotNode {
        bounds,
        computed_styles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_dom() {
        let cdp_json = serde_json::json!({
            "root": {
                "nodeId": 1,
                "backendNodeId": 1,
                "nodeType": 9,
                "nodeName": "#document",
                "nodeValue": "",
                "children": [{
                    "nodeId": 2,
                    "backendNodeId": 2,
                    "nodeType": 1,
                    "nodeName": "HTML",
                    "nodeValue": "",
                    "attributes": []
                }]
            }
        });

        let mut service = DomService::new();
        let root_id = service.parse_cdp_dom_tree(&cdp_json).unwrap();

        assert_eq!(root_id, 0);
        assert_eq!(service.arena().len(), 2);
    }

    #[test]
    fn test_parse_rendering_data() {
        let cdp_json = r##"{
            "root": {
                "nodeId": 1, "backendNodeId": 1, "nodeType": 9, "nodeName": "#document",
                "children": [{
                    "nodeId": 2, "backendNodeId": 20, "nodeType": 1, "nodeName": "INPUT",
                    "attributes": ["type", "email", "value", "old@example.com"],
                    "value": "new@example.com",
                    "bounds": [10, 20, 200, 30],
                    "computedStyles": { "display": "inline-block" }
                }, {
                    "nodeId": 3, "backendNodeId": 30, "nodeType": 1, "nodeName": "DIV",
                    "computedStyles": { "display": "none" },
                    "bounds": [0, 0, 0, 0]
                }]
            }
        }"##;

        let mut service = DomService::new();
        service.parse_cdp_str(cdp_json).unwrap();
        let arena = service.arena();

        let input = arena.get_by_backend_id(20).unwrap();
        assert_eq!(input.attr("type"), Some("email"));
        assert_eq!(input.form_value(), Some("new@example.com"));
        assert_eq!(input.bounds(), Some(&DomRect::new(10.0, 20.0, 200.0, 30.0)));
        assert_eq!(input.style("display"), Some("inline-block"));
        assert_eq!(input.is_visible, Some(true));

        let hidden = arena.get_by_backend_id(30).unwrap();
        assert_eq!(hidden.is_visible, Some(false));

        // the document node is not an element and gets no visibility
        assert_eq!(arena.root().unwrap().is_visible, None);
    }

    #[test]
    fn test_parse_frames_and_shadow_roots() {
        let cdp_json = serde_json::json!({
            "root": {
                "nodeId": 1, "backendNodeId": 1, "nodeType": 9, "nodeName": "#document",
                "children": [{
                    "nodeId": 2, "backendNodeId": 2, "nodeType": 1, "nodeName": "IFRAME",
                    "contentDocument": {
                        "nodeId": 3, "backendNodeId": 3, "nodeType": 9,
                        "nodeName": "#document"
                    },
                    "shadowRoots": [{
                        "nodeId": 4, "backendNodeId": 4, "nodeType": 11,
                        "nodeName": "#document-fragment"
                    }]
                }]
            }
        });

        let mut service = DomService::new();
        service.parse_cdp_dom_tree(&cdp_json).unwrap();
        let arena = service.arena();
        assert_eq!(arena.len(), 4);

        let iframe_id = arena.get_node_id_by_backend(2).unwrap();
        let frame_doc = arena.get_node_id_by_backend(3).unwrap();
        let shadow = arena.get_node_id_by_backend(4).unwrap();

        let iframe = arena.get(iframe_id).unwrap();
        assert_eq!(iframe.content_document_id, Some(frame_doc));
        assert_eq!(iframe.shadow_root_ids.as_deref(), Some(&[shadow][..]));
        assert!(iframe.children_ids.is_empty());
        assert_eq!(arena.get(frame_doc).unwrap().parent_id, Some(iframe_id));
        assert_eq!(arena.get(shadow).unwrap().node_type, NodeType::DocumentFragment);
    }

    #[test]
    fn test_parse_errors() {
        let mut service = DomService::new();

        let missing_root = serde_json::json!({ "nodeId": 1 });
        assert!(matches!(
            service.parse_cdp_dom_tree(&missing_root),
            Err(DomError::CdpError(_))
        ));

        let bad_type = serde_json::json!({
            "root": { "nodeId": 1, "backendNodeId": 1, "nodeType": 42, "nodeName": "?" }
        });
        assert!(matches!(
            service.parse_cdp_dom_tree(&bad_type),
            Err(DomError::InvalidNodeType { .. })
        ));

        assert!(matches!(
            service.parse_cdp_str("{ not json"),
            Err(DomError::ParseError(_))
        ));
    }
}
