//! Node types: NodeId, NodeKind, NodeData.

use std::collections::BTreeMap;

use slotmap::new_key_type;

use crate::host::EventHandler;

new_key_type! {
    /// Unique identifier for a host node. Copy, lightweight (u64).
    pub struct NodeId;
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element { tag: String },
    Text(String),
}

/// Data associated with a single host node.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub kind: NodeKind,
    /// Attributes, sorted by name.
    pub attributes: BTreeMap<String, String>,
    /// Installed event handlers, keyed by event name (`click`, `input`).
    pub handlers: BTreeMap<String, EventHandler>,
}

impl NodeData {
    /// An element node with no attributes.
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Element { tag: tag.into() },
            attributes: BTreeMap::new(),
            handlers: BTreeMap::new(),
        }
    }

    /// A text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Text(text.into()),
            attributes: BTreeMap::new(),
            handlers: BTreeMap::new(),
        }
    }

    /// Set an attribute (builder).
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Tag name, or `None` for text nodes.
    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { tag } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    /// Text content of a text node.
    pub fn as_text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text(_))
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Whether the whitespace-separated `class` attribute contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    pub fn handler(&self, event: &str) -> Option<&EventHandler> {
        self.handlers.get(event)
    }
}
