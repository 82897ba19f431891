//! In-memory B+ tree nodes.
//!
//! A node is a value: it knows its own [`NodeOffset`] and the offsets of its
//! children, never a live reference to another node. Mutating a node changes
//! only the copy in memory until the tree writes it back through the
//! [`NodeStore`](crate::storage::NodeStore).

use crate::common::NodeOffset;

/// Discriminator written as the first byte of every node record.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeTag {
    /// Internal node: keys plus child offsets.
    Internal = 0,
    /// Leaf node: keys plus values.
    Leaf = 1,
}

impl NodeTag {
    /// Convert from u8, returning `None` for unknown values.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(NodeTag::Internal),
            1 => Some(NodeTag::Leaf),
            _ => None,
        }
    }
}

/// Leaf node: keys paired 1:1 with opaque 64-bit values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafNode {
    pub offset: NodeOffset,
    pub keys: Vec<i64>,
    pub values: Vec<i64>,
}

impl LeafNode {
    /// Create an empty leaf at `offset`.
    pub fn new(offset: NodeOffset) -> Self {
        Self {
            offset,
            keys: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Index of the first key `> key`.
    fn upper_bound(&self, key: i64) -> usize {
        self.keys.iter().take_while(|&&k| k <= key).count()
    }

    /// Value stored under `key`, if any.
    ///
    /// With duplicate keys the most recently inserted entry wins: it sits
    /// at the end of the run of equal keys.
    pub fn get(&self, key: i64) -> Option<i64> {
        let loc = self.upper_bound(key).checked_sub(1)?;
        (self.keys[loc] == key).then_some(self.values[loc])
    }

    /// Insert in key order, after any entries with an equal key, so the
    /// newest duplicate is always the last of its run.
    pub fn insert(&mut self, key: i64, value: i64) {
        let loc = self.upper_bound(key);
        self.keys.insert(loc, key);
        self.values.insert(loc, value);
    }

    /// Move the upper half (`index >= len / 2`) into a new leaf at
    /// `sibling_offset`. The promoted key is the sibling's first key.
    pub fn split_off(&mut self, sibling_offset: NodeOffset) -> (i64, LeafNode) {
        let mid = self.keys.len() / 2;
        let sibling = LeafNode {
            offset: sibling_offset,
            keys: self.keys.split_off(mid),
            values: self.values.split_off(mid),
        };
        (sibling.keys[0], sibling)
    }
}

/// Internal node: `n` keys and `n + 1` child offsets.
///
/// Child `i` covers keys `k` with `keys[i-1] <= k < keys[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalNode {
    pub offset: NodeOffset,
    pub keys: Vec<i64>,
    pub children: Vec<NodeOffset>,
}

impl InternalNode {
    /// Create a root over two subtrees separated by `key`.
    pub fn new_root(offset: NodeOffset, left: NodeOffset, key: i64, right: NodeOffset) -> Self {
        Self {
            offset,
            keys: vec![key],
            children: vec![left, right],
        }
    }

    /// Slot of the child whose range contains `key`: the smallest `i` with
    /// `key < keys[i]`, or the last child.
    pub fn child_slot(&self, key: i64) -> usize {
        self.keys.iter().take_while(|&&k| key >= k).count()
    }

    /// Offset of the child whose range contains `key`.
    pub fn child_for(&self, key: i64) -> NodeOffset {
        self.children[self.child_slot(key)]
    }

    /// Record a split of the child at `slot`: `key` goes in at `slot` and
    /// `right` directly after the child that split.
    pub fn insert_child(&mut self, slot: usize, key: i64, right: NodeOffset) {
        self.keys.insert(slot, key);
        self.children.insert(slot + 1, right);
    }

    /// Carve the upper half into a new internal node at `sibling_offset`.
    ///
    /// `keys[len / 2]` is promoted and kept in neither half. Every key moved
    /// to the sibling takes the child that follows it, and the sibling also
    /// takes the child right after the promoted key as its first child.
    pub fn split_off(&mut self, sibling_offset: NodeOffset) -> (i64, InternalNode) {
        let mid = self.keys.len() / 2;
        let mut upper_keys = self.keys.split_off(mid);
        let promoted = upper_keys.remove(0);
        let sibling = InternalNode {
            offset: sibling_offset,
            keys: upper_keys,
            children: self.children.split_off(mid + 1),
        };
        (promoted, sibling)
    }
}

/// A B+ tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf(LeafNode),
    Internal(InternalNode),
}

impl Node {
    #[inline]
    pub fn offset(&self) -> NodeOffset {
        match self {
            Node::Leaf(leaf) => leaf.offset,
            Node::Internal(internal) => internal.offset,
        }
    }

    #[inline]
    pub fn keys(&self) -> &[i64] {
        match self {
            Node::Leaf(leaf) => &leaf.keys,
            Node::Internal(internal) => &internal.keys,
        }
    }

    #[inline]
    pub fn tag(&self) -> NodeTag {
        match self {
            Node::Leaf(_) => NodeTag::Leaf,
            Node::Internal(_) => NodeTag::Internal,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Number of keys held.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }
}

/// Result of an overflowing node: the separator for the parent and the new
/// right-hand sibling. Never persisted as such.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub key: i64,
    pub right: Node,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_with(keys: &[i64]) -> LeafNode {
        let mut leaf = LeafNode::new(NodeOffset::new(8));
        for &k in keys {
            leaf.insert(k, k * 100);
        }
        leaf
    }

    #[test]
    fn test_node_tag_from_u8() {
        assert_eq!(NodeTag::from_u8(0), Some(NodeTag::Internal));
        assert_eq!(NodeTag::from_u8(1), Some(NodeTag::Leaf));
        assert_eq!(NodeTag::from_u8(2), None);
        assert_eq!(NodeTag::from_u8(255), None);
    }

    #[test]
    fn test_leaf_insert_keeps_order() {
        let leaf = leaf_with(&[10, 20, 5, 6]);
        assert_eq!(leaf.keys, vec![5, 6, 10, 20]);
        assert_eq!(leaf.values, vec![500, 600, 1000, 2000]);
    }

    #[test]
    fn test_leaf_get() {
        let leaf = leaf_with(&[3, 1, 2]);
        assert_eq!(leaf.get(2), Some(200));
        assert_eq!(leaf.get(4), None);
        assert_eq!(leaf.get(0), None);
    }

    #[test]
    fn test_leaf_duplicate_newest_wins() {
        let mut leaf = leaf_with(&[7]);
        leaf.insert(7, 1);
        assert_eq!(leaf.keys, vec![7, 7]);
        assert_eq!(leaf.values, vec![700, 1]);
        assert_eq!(leaf.get(7), Some(1));
    }

    #[test]
    fn test_newest_duplicate_survives_split() {
        let mut leaf = LeafNode::new(NodeOffset::new(8));
        for value in 0..4 {
            leaf.insert(5, value);
        }
        let (key, right) = leaf.split_off(NodeOffset::new(69));

        // Lookups for 5 now go right, where the newest entry ended up.
        assert_eq!(key, 5);
        assert_eq!(right.get(5), Some(3));
    }

    #[test]
    fn test_leaf_split() {
        let mut leaf = leaf_with(&[10, 20, 5, 6]);
        let (key, right) = leaf.split_off(NodeOffset::new(69));

        assert_eq!(key, 10);
        assert_eq!(leaf.keys, vec![5, 6]);
        assert_eq!(right.keys, vec![10, 20]);
        assert_eq!(right.values, vec![1000, 2000]);
        assert_eq!(right.offset, NodeOffset::new(69));
    }

    #[test]
    fn test_child_slot() {
        let node = InternalNode {
            offset: NodeOffset::new(8),
            keys: vec![10, 20],
            children: vec![NodeOffset::new(100), NodeOffset::new(200), NodeOffset::new(300)],
        };
        assert_eq!(node.child_slot(5), 0);
        assert_eq!(node.child_slot(10), 1);
        assert_eq!(node.child_slot(19), 1);
        assert_eq!(node.child_slot(20), 2);
        assert_eq!(node.child_for(99), NodeOffset::new(300));
    }

    #[test]
    fn test_internal_split_keeps_child_counts() {
        let mut node = InternalNode::new_root(
            NodeOffset::new(8),
            NodeOffset::new(100),
            10,
            NodeOffset::new(200),
        );
        node.insert_child(1, 20, NodeOffset::new(300));
        node.insert_child(2, 30, NodeOffset::new(400));
        node.insert_child(3, 40, NodeOffset::new(500));
        assert_eq!(node.keys, vec![10, 20, 30, 40]);

        let (promoted, right) = node.split_off(NodeOffset::new(600));

        assert_eq!(promoted, 30);
        assert_eq!(node.keys, vec![10, 20]);
        assert_eq!(
            node.children,
            vec![NodeOffset::new(100), NodeOffset::new(200), NodeOffset::new(300)]
        );
        assert_eq!(right.keys, vec![40]);
        assert_eq!(right.children, vec![NodeOffset::new(400), NodeOffset::new(500)]);
        assert_eq!(right.children.len(), right.keys.len() + 1);
    }

    #[test]
    fn test_insert_child_after_split_child() {
        let mut node = InternalNode::new_root(
            NodeOffset::new(8),
            NodeOffset::new(100),
            50,
            NodeOffset::new(200),
        );
        // Child 0 split at 20.
        node.insert_child(0, 20, NodeOffset::new(300));
        assert_eq!(node.keys, vec![20, 50]);
        assert_eq!(
            node.children,
            vec![NodeOffset::new(100), NodeOffset::new(300), NodeOffset::new(200)]
        );
    }

    #[test]
    fn test_node_accessors() {
        let node = Node::Leaf(leaf_with(&[1, 2]));
        assert!(node.is_leaf());
        assert_eq!(node.tag(), NodeTag::Leaf);
        assert_eq!(node.len(), 2);
        assert_eq!(node.offset(), NodeOffset::new(8));
        assert!(!node.is_empty());
    }
}
