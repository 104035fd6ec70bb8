//! Host surface: the primitive operations the reconciler needs from a
//! retained visual tree.
//!
//! The core never looks inside a host node. It only creates nodes, sets and
//! removes attributes and handlers, and moves children around through the
//! [`Host`] trait. [`crate::dom::Dom`] is the in-memory implementation used by
//! tests and headless rendering.

pub mod event;

pub use event::{Event, EventHandler};

use std::fmt;
use std::hash::Hash;

/// Primitive operations on a retained host tree.
///
/// `Node` is an opaque, cheaply clonable handle.
pub trait Host {
    type Node: Clone + Eq + Hash + fmt::Debug;

    /// Create a detached element node.
    fn create_node(&mut self, tag: &str) -> Self::Node;

    /// Create a detached text node.
    fn create_text_node(&mut self, text: &str) -> Self::Node;

    fn set_attribute(&mut self, node: &Self::Node, key: &str, value: &str);

    fn remove_attribute(&mut self, node: &Self::Node, key: &str);

    /// Install (`Some`) or clear (`None`) the handler for `event`.
    fn set_event_handler(&mut self, node: &Self::Node, event: &str, handler: Option<EventHandler>);

    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node);

    /// Put `new` where `old` is and discard `old` with its subtree.
    fn replace_child(&mut self, parent: &Self::Node, old: &Self::Node, new: &Self::Node);

    /// Detach and discard `child` with its subtree.
    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node);

    fn child_count(&self, node: &Self::Node) -> usize;

    fn child_at(&self, node: &Self::Node, index: usize) -> Option<Self::Node>;
}
