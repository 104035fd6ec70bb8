//! Tree operations: create, attach, replace, remove, walk.
//!
//! [`Dom`] is the in-memory host tree. Nodes are created detached and only
//! enter the tree through `append_child` / `replace_child`. Every mutation
//! issued through the [`Host`] surface is also appended to a log, which tests
//! use to check that a patch touched exactly what it had to.

use std::collections::VecDeque;

use slotmap::{SecondaryMap, SlotMap};

use super::node::{NodeData, NodeId};
use crate::host::{EventHandler, Host};

/// Empty slice constant for returning when a node has no children.
const EMPTY_CHILDREN: &[NodeId] = &[];

/// One host mutation, as recorded by [`Dom`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateNode { node: NodeId, tag: String },
    CreateText { node: NodeId, text: String },
    SetAttribute { node: NodeId, key: String, value: String },
    RemoveAttribute { node: NodeId, key: String },
    SetHandler { node: NodeId, event: String, installed: bool },
    AppendChild { parent: NodeId, child: NodeId },
    ReplaceChild { parent: NodeId, old: NodeId, new: NodeId },
    RemoveChild { parent: NodeId, child: NodeId },
}

/// The in-memory host tree, backed by a slotmap arena.
///
/// All nodes live in a single `SlotMap`. Parent/child relationships are stored
/// in secondary maps so that node removal is O(subtree size) and lookup is O(1).
pub struct Dom {
    pub(crate) nodes: SlotMap<NodeId, NodeData>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
    mutations: Vec<Mutation>,
}

impl Dom {
    /// Create an empty DOM.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
            mutations: Vec::new(),
        }
    }

    /// Insert a detached node. Not recorded in the mutation log.
    pub fn insert(&mut self, data: NodeData) -> NodeId {
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        id
    }

    /// Insert a node as the last child of `parent`. Not recorded.
    ///
    /// # Panics
    ///
    /// Panics (debug) if `parent` does not exist in the tree.
    pub fn insert_child(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        debug_assert!(
            self.nodes.contains_key(parent),
            "parent node does not exist"
        );
        let id = self.insert(data);
        self.attach(parent, id);
        id
    }

    /// Remove a node and all its descendants.
    ///
    /// Returns the `NodeData` for the removed node, or `None` if it didn't exist.
    pub fn remove(&mut self, id: NodeId) -> Option<NodeData> {
        if !self.nodes.contains_key(id) {
            return None;
        }
        self.detach(id);

        let mut to_remove = VecDeque::new();
        to_remove.push_back(id);
        let mut removed_root_data = None;

        while let Some(current) = to_remove.pop_front() {
            if let Some(kids) = self.children.remove(current) {
                to_remove.extend(kids);
            }
            self.parent.remove(current);
            let data = self.nodes.remove(current);
            if current == id {
                removed_root_data = data;
            }
        }

        removed_root_data
    }

    /// Detach `node` from its parent, if any, keeping its subtree.
    fn detach(&mut self, node: NodeId) {
        if let Some(old_parent) = self.parent.remove(node) {
            if let Some(siblings) = self.children.get_mut(old_parent) {
                siblings.retain(|&child| child != node);
            }
        }
    }

    /// Move `node` to the end of `parent`'s children.
    fn attach(&mut self, parent: NodeId, node: NodeId) {
        self.detach(node);
        self.parent.insert(node, parent);
        if let Some(kids) = self.children.get_mut(parent) {
            kids.push(node);
        }
    }

    /// Get the parent of a node, if it has one.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied()
    }

    /// Get the children of a node. Returns an empty slice if the node has no children
    /// or does not exist.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Walk from `id` up to the root, collecting ancestor node ids.
    ///
    /// The returned vec does **not** include `id` itself.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    /// Immutable access to a node's data.
    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    /// Mutable access to a node's data. Changes made here bypass the log.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id)
    }

    /// Number of nodes in the arena, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the DOM contains a node with the given id.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// Mutations recorded since the last [`Dom::take_mutations`].
    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    /// Drain the mutation log.
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.mutations)
    }

    fn record(&mut self, mutation: Mutation) {
        tracing::trace!(?mutation, "host mutation");
        self.mutations.push(mutation);
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Host surface
// ---------------------------------------------------------------------------

impl Host for Dom {
    type Node = NodeId;

    fn create_node(&mut self, tag: &str) -> NodeId {
        let node = self.insert(NodeData::element(tag));
        self.record(Mutation::CreateNode {
            node,
            tag: tag.to_owned(),
        });
        node
    }

    fn create_text_node(&mut self, text: &str) -> NodeId {
        let node = self.insert(NodeData::text(text));
        self.record(Mutation::CreateText {
            node,
            text: text.to_owned(),
        });
        node
    }

    fn set_attribute(&mut self, node: &NodeId, key: &str, value: &str) {
        if let Some(data) = self.nodes.get_mut(*node) {
            data.attributes.insert(key.to_owned(), value.to_owned());
            self.record(Mutation::SetAttribute {
                node: *node,
                key: key.to_owned(),
                value: value.to_owned(),
            });
        }
    }

    fn remove_attribute(&mut self, node: &NodeId, key: &str) {
        if let Some(data) = self.nodes.get_mut(*node) {
            data.attributes.remove(key);
            self.record(Mutation::RemoveAttribute {
                node: *node,
                key: key.to_owned(),
            });
        }
    }

    fn set_event_handler(&mut self, node: &NodeId, event: &str, handler: Option<EventHandler>) {
        if let Some(data) = self.nodes.get_mut(*node) {
            let installed = handler.is_some();
            match handler {
                Some(handler) => data.handlers.insert(event.to_owned(), handler),
                None => data.handlers.remove(event),
            };
            self.record(Mutation::SetHandler {
                node: *node,
                event: event.to_owned(),
                installed,
            });
        }
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) {
        debug_assert!(self.contains(*parent), "parent node does not exist");
        self.attach(*parent, *child);
        self.record(Mutation::AppendChild {
            parent: *parent,
            child: *child,
        });
    }

    fn replace_child(&mut self, parent: &NodeId, old: &NodeId, new: &NodeId) {
        self.detach(*new);
        let Some(position) = self.children(*parent).iter().position(|c| c == old) else {
            debug_assert!(false, "replace_child: old node is not a child of parent");
            return;
        };
        if let Some(kids) = self.children.get_mut(*parent) {
            kids[position] = *new;
        }
        self.parent.remove(*old);
        self.parent.insert(*new, *parent);
        self.remove(*old);
        self.record(Mutation::ReplaceChild {
            parent: *parent,
            old: *old,
            new: *new,
        });
    }

    fn remove_child(&mut self, parent: &NodeId, child: &NodeId) {
        debug_assert_eq!(self.parent(*child), Some(*parent), "not a child of parent");
        self.remove(*child);
        self.record(Mutation::RemoveChild {
            parent: *parent,
            child: *child,
        });
    }

    fn child_count(&self, node: &NodeId) -> usize {
        self.children(*node).len()
    }

    fn child_at(&self, node: &NodeId, index: usize) -> Option<NodeId> {
        self.children(*node).get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Build a small test tree:
    /// ```text
    ///       root
    ///      /    \
    ///    a        b
    ///   / \
    ///  c   d
    /// ```
    fn build_tree() -> (Dom, NodeId, NodeId, NodeId, NodeId, NodeId) {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::element("main"));
        let a = dom.insert_child(root, NodeData::element("section"));
        let b = dom.insert_child(root, NodeData::element("aside"));
        let c = dom.insert_child(a, NodeData::element("button"));
        let d = dom.insert_child(a, NodeData::text("label"));
        (dom, root, a, b, c, d)
    }

    #[test]
    fn insert_child_parent_relationship() {
        let (dom, root, a, _b, c, _d) = build_tree();
        assert_eq!(dom.parent(a), Some(root));
        assert_eq!(dom.parent(c), Some(a));
        assert_eq!(dom.parent(root), None);
    }

    #[test]
    fn children_list() {
        let (dom, root, a, b, c, d) = build_tree();
        assert_eq!(dom.children(root), &[a, b]);
        assert_eq!(dom.children(a), &[c, d]);
        assert!(dom.children(c).is_empty());
    }

    #[test]
    fn ancestors() {
        let (dom, root, a, _b, c, _d) = build_tree();
        assert_eq!(dom.ancestors(c), vec![a, root]);
        assert!(dom.ancestors(root).is_empty());
    }

    #[test]
    fn remove_subtree() {
        let (mut dom, root, a, b, c, d) = build_tree();
        dom.remove(a);
        assert!(!dom.contains(a));
        assert!(!dom.contains(c));
        assert!(!dom.contains(d));
        assert_eq!(dom.children(root), &[b]);
        assert_eq!(dom.len(), 2);
    }

    #[test]
    fn remove_nonexistent() {
        let mut dom = Dom::new();
        let id = dom.insert(NodeData::element("x"));
        dom.remove(id);
        assert!(dom.remove(id).is_none());
    }

    #[test]
    fn walk_depth_first() {
        let (dom, root, a, b, c, d) = build_tree();
        assert_eq!(dom.walk_depth_first(root), vec![root, a, c, d, b]);
    }

    #[test]
    fn created_nodes_are_detached() {
        let mut dom = Dom::new();
        let node = dom.create_node("div");
        assert!(dom.contains(node));
        assert_eq!(dom.parent(node), None);
        assert_eq!(
            dom.take_mutations(),
            vec![Mutation::CreateNode {
                node,
                tag: "div".into()
            }]
        );
        assert!(dom.mutations().is_empty());
    }

    #[test]
    fn append_moves_existing_child() {
        let (mut dom, root, a, b, c, d) = build_tree();
        dom.append_child(&b, &c);
        assert_eq!(dom.children(a), &[d]);
        assert_eq!(dom.children(b), &[c]);
        assert_eq!(dom.ancestors(c), vec![b, root]);
    }

    #[test]
    fn replace_child_keeps_position_and_discards_old() {
        let (mut dom, root, a, b, c, _d) = build_tree();
        let fresh = dom.create_node("nav");
        dom.replace_child(&root, &a, &fresh);
        assert_eq!(dom.children(root), &[fresh, b]);
        assert_eq!(dom.parent(fresh), Some(root));
        assert!(!dom.contains(a));
        assert!(!dom.contains(c));
    }

    #[test]
    fn remove_child_discards_subtree() {
        let (mut dom, root, a, b, c, _d) = build_tree();
        dom.take_mutations();
        dom.remove_child(&root, &a);
        assert_eq!(dom.children(root), &[b]);
        assert!(!dom.contains(c));
        assert_eq!(
            dom.take_mutations(),
            vec![Mutation::RemoveChild {
                parent: root,
                child: a
            }]
        );
    }

    #[test]
    fn attributes_and_handlers() {
        let mut dom = Dom::new();
        let node = dom.create_node("button");
        dom.set_attribute(&node, "class", "primary");
        dom.set_event_handler(&node, "click", Some(EventHandler::new(|_| {})));
        assert_eq!(dom.get(node).unwrap().attribute("class"), Some("primary"));
        assert!(dom.get(node).unwrap().handler("click").is_some());

        dom.remove_attribute(&node, "class");
        dom.set_event_handler(&node, "click", None);
        assert!(dom.get(node).unwrap().attributes.is_empty());
        assert!(dom.get(node).unwrap().handler("click").is_none());
    }

    #[test]
    fn indexed_child_access() {
        let (dom, root, a, b, ..) = build_tree();
        assert_eq!(dom.child_count(&root), 2);
        assert_eq!(dom.child_at(&root, 0), Some(a));
        assert_eq!(dom.child_at(&root, 1), Some(b));
        assert_eq!(dom.child_at(&root, 2), None);
    }
}
