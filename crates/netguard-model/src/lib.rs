//! Config tree model.
//!
//! A parsed configuration is a forest of [`ConfigNode`]s. Nodes own their children
//! exclusively, keep source order, and are never mutated once the parser hands them out.

#![forbid(unsafe_code)]

mod node;
pub mod text;
mod walk;

pub use node::{ConfigNode, NodeKind};
pub use walk::{PreOrder, count_nodes, outline, preorder};
