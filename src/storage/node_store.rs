//! Node Store - offset-addressed node I/O over a single index file.
//!
//! The [`NodeStore`] handles all direct file operations of the index:
//! - Reserving slots for new nodes
//! - Reading and writing node records at their offsets
//! - Reading and writing the root pointer

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::atomic::Ordering;

use tracing::{info, trace};

use crate::common::config::{IndexConfig, ROOT_POINTER_SIZE};
use crate::common::{Error, NodeOffset, Result};
use crate::index::btree::codec;
use crate::index::btree::{LeafNode, Node};
use crate::storage::StoreStats;

/// Reads and writes tree nodes by offset in one index file.
///
/// # File Layout
/// ```text
/// ┌──────────────┬──────────┬──────────┬─────┬──────────┐
/// │ root pointer │ slot 0   │ slot 1   │ ... │ slot N   │
/// │ (8 bytes)    │ (S)      │ (S)      │     │ (S)      │
/// └──────────────┴──────────┴──────────┴─────┴──────────┘
/// Offset:  0           8        8+S            8+N×S
/// ```
///
/// `S` is [`IndexConfig::slot_size`]. A slot is reserved by
/// [`allocate`](Self::allocate) and zero-filled until its node is written.
/// A node record may be shorter than its slot; the rest of the slot holds
/// zeros or leftovers from an earlier, longer record.
///
/// The store never caches nodes. Every [`read`](Self::read) goes to the file.
///
/// # Durability
/// Writes go straight to the file without `fsync()`. Call
/// [`sync`](Self::sync) to force them to disk.
pub struct NodeStore {
    file: File,
    /// Current file length, including reserved but unwritten slots.
    len: u64,
    config: IndexConfig,
    stats: StoreStats,
}

impl NodeStore {
    /// Open the index file at `path`, creating it if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the file cannot be
    /// opened.
    pub fn open<P: AsRef<Path>>(path: P, config: IndexConfig) -> Result<Self> {
        config.validate()?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let len = file.metadata()?.len();

        Ok(Self {
            file,
            len,
            config,
            stats: StoreStats::new(),
        })
    }

    /// Load the root node, initializing an empty tree if the file is empty.
    ///
    /// On an empty file this writes the root pointer header, allocates an
    /// empty leaf right after it and points the header at the leaf.
    ///
    /// # Errors
    /// - `Error::TruncatedHeader` if the file is non-empty but shorter than
    ///   the root pointer
    /// - `Error::SlotMismatch` if the file was created with another fan-out
    /// - `Error::InvalidOffset` / `Error::CorruptNode` if the root pointer
    ///   does not lead to a node
    pub fn bootstrap(&mut self) -> Result<Node> {
        if self.len == 0 {
            self.file.seek(SeekFrom::Start(0))?;
            self.file.write_all(&[0u8; ROOT_POINTER_SIZE as usize])?;
            self.len = ROOT_POINTER_SIZE;

            let root = Node::Leaf(LeafNode::new(self.allocate()?));
            self.write(&root)?;
            self.write_root_pointer(root.offset())?;

            info!(root = root.offset().0, "initialized empty index");
            return Ok(root);
        }

        if self.len < ROOT_POINTER_SIZE {
            return Err(Error::TruncatedHeader(self.len));
        }
        let slot = self.config.slot_size();
        if (self.len - ROOT_POINTER_SIZE) % slot != 0 {
            return Err(Error::SlotMismatch { len: self.len, slot });
        }

        let root_offset = self.read_root_pointer()?;
        let root = self.read(root_offset)?;
        info!(root = root_offset.0, file_len = self.len, "loaded index");
        Ok(root)
    }

    /// Reserve a slot for a node that has not been written yet.
    ///
    /// Returns the current end of file and grows the file by one zeroed
    /// slot, so the next call returns a different offset even if this node
    /// is never written.
    pub fn allocate(&mut self) -> Result<NodeOffset> {
        let offset = NodeOffset::new(self.len);
        let new_len = self.len + self.config.slot_size();

        self.file.set_len(new_len)?;
        self.len = new_len;

        self.stats.allocations.fetch_add(1, Ordering::Relaxed);
        trace!(offset = offset.0, "allocated node slot");
        Ok(offset)
    }

    /// Write `node` at its offset, overwriting whatever record is there.
    ///
    /// # Errors
    /// - `Error::InvalidOffset` if the offset was never allocated
    /// - `Error::NodeTooLarge` if the record does not fit in a slot
    pub fn write(&mut self, node: &Node) -> Result<()> {
        let offset = node.offset();
        self.check_offset(offset)?;

        let bytes = codec::encode(node);
        let slot = self.config.slot_size();
        if bytes.len() as u64 > slot {
            return Err(Error::NodeTooLarge {
                offset: offset.0,
                len: bytes.len() as u64,
                slot,
            });
        }

        self.file.seek(SeekFrom::Start(offset.0))?;
        self.file.write_all(&bytes)?;

        self.stats.nodes_written.fetch_add(1, Ordering::Relaxed);
        self.stats
            .bytes_written
            .fetch_add(bytes.len() as u64, Ordering::Relaxed);
        trace!(offset = offset.0, leaf = node.is_leaf(), keys = node.len(), "wrote node");
        Ok(())
    }

    /// Read the node stored at `offset`.
    ///
    /// # Errors
    /// - `Error::InvalidOffset` if `offset` is inside the header or past EOF
    /// - `Error::CorruptNode` if the bytes are not a node record
    pub fn read(&mut self, offset: NodeOffset) -> Result<Node> {
        self.check_offset(offset)?;

        // A record never extends past its slot, but the final slot of a file
        // produced elsewhere may be cut short.
        let available = (self.len - offset.0).min(self.config.slot_size());
        let mut buf = vec![0u8; available as usize];
        self.file.seek(SeekFrom::Start(offset.0))?;
        self.file.read_exact(&mut buf)?;

        let node = codec::decode(offset, &mut buf.as_slice(), self.config.fan_out - 1)?;

        self.stats.nodes_read.fetch_add(1, Ordering::Relaxed);
        trace!(offset = offset.0, leaf = node.is_leaf(), keys = node.len(), "read node");
        Ok(node)
    }

    /// Read the root pointer from offset 0.
    pub fn read_root_pointer(&mut self) -> Result<NodeOffset> {
        let mut buf = [0u8; ROOT_POINTER_SIZE as usize];
        self.file.seek(SeekFrom::Start(0))?;
        self.file.read_exact(&mut buf)?;
        Ok(NodeOffset::new(u64::from_be_bytes(buf)))
    }

    /// Point the header at a new root.
    pub fn write_root_pointer(&mut self, root: NodeOffset) -> Result<()> {
        self.check_offset(root)?;

        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&root.0.to_be_bytes())?;

        self.stats.root_pointer_writes.fetch_add(1, Ordering::Relaxed);
        trace!(root = root.0, "wrote root pointer");
        Ok(())
    }

    /// Force all written data to disk.
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    /// Current file length in bytes, reserved slots included.
    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// True if nothing, not even the root pointer, has been written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    #[inline]
    pub fn stats(&self) -> &StoreStats {
        &self.stats
    }

    fn check_offset(&self, offset: NodeOffset) -> Result<()> {
        if !offset.is_node() || offset.0 >= self.len {
            return Err(Error::InvalidOffset(offset.0));
        }
        Ok(())
    }
}
