//! B+ tree engine: search and insert-with-split over a [`NodeStore`].

use tracing::debug;

use crate::common::config::{FlushPolicy, IndexConfig};
use crate::common::{Error, NodeOffset, Result};
use crate::storage::{NodeStore, StoreStats};

use super::node::{InternalNode, Node, Split};

/// Deepest tree a traversal follows before declaring the file corrupt.
///
/// Far beyond any real tree; it only stops cycles in damaged files.
const MAX_DEPTH: usize = 64;

/// What an insert did to the node it was applied to.
enum InsertOutcome {
    /// The node itself was not modified.
    Unchanged,
    /// The node was modified and still fits.
    Updated,
    /// The node overflowed and was split; it now holds the lower half.
    Split(Split),
}

/// A B+ tree whose nodes live in a [`NodeStore`].
///
/// Only the root is kept in memory. Every other node is read from the store
/// each time a search or insert passes through it.
///
/// # Persistence
/// The root is written after every insert. When the root splits, its new
/// right sibling and the new root are written and the root pointer is
/// updated. Everything else depends on the configured [`FlushPolicy`]:
/// - `Full`: every node mutated during the descent is written back, and so
///   is the old root, which now holds the left half of the split.
/// - `Legacy`: none of them are. A non-root node that gained or lost keys
///   keeps its old image on disk, and since nodes are always re-read, the
///   change is invisible from then on. This includes the left half of a
///   root split.
pub struct BPlusTree {
    store: NodeStore,
    root: Node,
}

impl BPlusTree {
    /// Load the tree from `store`, initializing an empty one if needed.
    pub fn open(mut store: NodeStore) -> Result<Self> {
        let root = store.bootstrap()?;
        Ok(Self { store, root })
    }

    /// Look up the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key is absent.
    pub fn search(&mut self, key: i64) -> Result<Option<i64>> {
        let mut next = match &self.root {
            Node::Leaf(leaf) => return Ok(leaf.get(key)),
            Node::Internal(internal) => internal.child_for(key),
        };

        for _ in 0..MAX_DEPTH {
            match self.store.read(next)? {
                Node::Leaf(leaf) => return Ok(leaf.get(key)),
                Node::Internal(internal) => next = internal.child_for(key),
            }
        }

        Err(Error::CorruptNode {
            offset: next.0,
            reason: "tree exceeds maximum depth",
        })
    }

    /// Insert `key -> value`. An existing entry for `key` is shadowed, not
    /// replaced: both stay in the leaf and lookups return the newer one.
    ///
    /// # Errors
    /// I/O errors abort the insert midway. Nothing is rolled back, so the
    /// index file may then hold some of the insert's writes but not others.
    pub fn insert(&mut self, key: i64, value: i64) -> Result<()> {
        let outcome = Self::insert_into(&mut self.store, &mut self.root, key, value)?;

        if let InsertOutcome::Split(split) = outcome {
            self.store.write(&split.right)?;
            if self.config().flush_policy == FlushPolicy::Full {
                self.store.write(&self.root)?;
            }

            let new_root = InternalNode::new_root(
                self.store.allocate()?,
                self.root.offset(),
                split.key,
                split.right.offset(),
            );
            debug!(
                root = new_root.offset.0,
                separator = split.key,
                left = self.root.offset().0,
                right = split.right.offset().0,
                "root split, tree grows by one level"
            );
            self.root = Node::Internal(new_root);
            self.store.write(&self.root)?;
            self.store.write_root_pointer(self.root.offset())?;
        } else {
            self.store.write(&self.root)?;
        }

        Ok(())
    }

    fn insert_into(
        store: &mut NodeStore,
        node: &mut Node,
        key: i64,
        value: i64,
    ) -> Result<InsertOutcome> {
        let fan_out = store.config().fan_out;

        match node {
            Node::Leaf(leaf) => {
                leaf.insert(key, value);
                if leaf.keys.len() < fan_out {
                    return Ok(InsertOutcome::Updated);
                }

                let (separator, right) = leaf.split_off(store.allocate()?);
                debug!(
                    left = leaf.offset.0,
                    right = right.offset.0,
                    separator,
                    "split leaf"
                );
                Ok(InsertOutcome::Split(Split {
                    key: separator,
                    right: Node::Leaf(right),
                }))
            }
            Node::Internal(internal) => {
                let slot = internal.child_slot(key);
                let mut child = store.read(internal.children[slot])?;
                let outcome = Self::insert_into(store, &mut child, key, value)?;
                let flush = store.config().flush_policy == FlushPolicy::Full;

                let split = match outcome {
                    InsertOutcome::Unchanged => return Ok(InsertOutcome::Unchanged),
                    InsertOutcome::Updated => {
                        if flush {
                            store.write(&child)?;
                        }
                        return Ok(InsertOutcome::Unchanged);
                    }
                    InsertOutcome::Split(split) => split,
                };

                if flush {
                    store.write(&child)?;
                    store.write(&split.right)?;
                }

                internal.insert_child(slot, split.key, split.right.offset());
                if internal.keys.len() < fan_out {
                    return Ok(InsertOutcome::Updated);
                }

                let (separator, right) = internal.split_off(store.allocate()?);
                debug!(
                    left = internal.offset.0,
                    right = right.offset.0,
                    separator,
                    "split internal node"
                );
                Ok(InsertOutcome::Split(Split {
                    key: separator,
                    right: Node::Internal(right),
                }))
            }
        }
    }

    /// Number of levels from the root down to the leftmost leaf.
    /// A tree whose root is a leaf has depth 1.
    pub fn depth(&mut self) -> Result<usize> {
        let mut next = match &self.root {
            Node::Leaf(_) => return Ok(1),
            Node::Internal(internal) => internal.children[0],
        };

        for depth in 2..=MAX_DEPTH {
            match self.store.read(next)? {
                Node::Leaf(_) => return Ok(depth),
                Node::Internal(internal) => next = internal.children[0],
            }
        }

        Err(Error::CorruptNode {
            offset: next.0,
            reason: "tree exceeds maximum depth",
        })
    }

    /// Every node reachable from the root, in pre-order with children
    /// visited left to right. Leaves therefore come out in key order.
    ///
    /// Diagnostic traversal: it reads the whole tree.
    pub fn nodes(&mut self) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();
        // Stack of (node, depth); children are pushed in reverse.
        let mut stack = vec![(self.root.clone(), 1usize)];

        while let Some((node, depth)) = stack.pop() {
            if depth > MAX_DEPTH {
                return Err(Error::CorruptNode {
                    offset: node.offset().0,
                    reason: "tree exceeds maximum depth",
                });
            }
            if let Node::Internal(internal) = &node {
                for &child in internal.children.iter().rev() {
                    stack.push((self.store.read(child)?, depth + 1));
                }
            }
            nodes.push(node);
        }

        Ok(nodes)
    }

    /// All `(key, value)` pairs in leaf order.
    pub fn entries(&mut self) -> Result<Vec<(i64, i64)>> {
        let entries = self
            .nodes()?
            .into_iter()
            .filter_map(|node| match node {
                Node::Leaf(leaf) => Some(leaf.keys.into_iter().zip(leaf.values)),
                Node::Internal(_) => None,
            })
            .flatten()
            .collect();
        Ok(entries)
    }

    /// Read any node by offset.
    pub fn read_node(&mut self, offset: NodeOffset) -> Result<Node> {
        self.store.read(offset)
    }

    /// The in-memory root.
    #[inline]
    pub fn root(&self) -> &Node {
        &self.root
    }

    #[inline]
    pub fn root_offset(&self) -> NodeOffset {
        self.root.offset()
    }

    #[inline]
    pub fn config(&self) -> &IndexConfig {
        self.store.config()
    }

    #[inline]
    pub fn stats(&self) -> &StoreStats {
        self.store.stats()
    }

    /// Force all written nodes to disk.
    pub fn sync(&mut self) -> Result<()> {
        self.store.sync()
    }
}
