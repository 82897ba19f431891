//! Disk-backed B+ tree.
//!
//! - [`node`] - Leaf/internal node values and their split logic
//! - [`codec`] - Byte layout of a node record
//! - [`BPlusTree`] - Search and insert-with-split over a node store

pub mod codec;
pub mod node;
mod tree;

pub use node::{InternalNode, LeafNode, Node, NodeTag, Split};
pub use tree::BPlusTree;
