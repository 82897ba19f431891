//! Node offset type.

use std::fmt;

use crate::common::config::ROOT_POINTER_SIZE;

/// Byte position of a node inside the index file.
///
/// Offsets are the only way to address a node: following one always means
/// asking the [`NodeStore`](crate::storage::NodeStore) to read it.
///
/// # Example
/// ```
/// use indexdb::NodeOffset;
///
/// let offset = NodeOffset::new(8);
/// assert!(offset.is_node());
/// assert!(!NodeOffset::new(0).is_node());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeOffset(pub u64);

impl NodeOffset {
    /// Create a new NodeOffset.
    #[inline]
    pub fn new(offset: u64) -> Self {
        NodeOffset(offset)
    }

    /// True if the offset lies past the root-pointer header.
    #[inline]
    pub fn is_node(&self) -> bool {
        self.0 >= ROOT_POINTER_SIZE
    }
}

impl fmt::Display for NodeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node@{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_offsets_are_not_nodes() {
        for raw in 0..ROOT_POINTER_SIZE {
            assert!(!NodeOffset::new(raw).is_node());
        }
        assert!(NodeOffset::new(ROOT_POINTER_SIZE).is_node());
    }

    #[test]
    fn test_node_offset_ordering() {
        assert!(NodeOffset::new(8) < NodeOffset::new(69));
    }

    #[test]
    fn test_node_offset_display() {
        assert_eq!(format!("{}", NodeOffset::new(42)), "Node@42");
    }
}
