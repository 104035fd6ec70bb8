//! In-memory host tree: slotmap-backed nodes implementing [`crate::host::Host`].

pub mod node;
pub mod query;
pub mod tree;

pub use node::{NodeData, NodeId, NodeKind};
pub use tree::{Dom, Mutation};
