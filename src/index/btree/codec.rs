//! Node codec: converts a node to its byte record and back.
//!
//! # Record Layout (big-endian)
//! ```text
//! Leaf:      [tag=1 : u8] [n : u32] n × ([key : i64] [value : i64])
//! Internal:  [tag=0 : u8] [n : u32] n × ([key : i64] [child : u64]) [last child : u64]
//! ```
//!
//! The count field fixes the record length, so decoding stops exactly at the
//! end of the record. Bytes after it are never touched: an earlier, longer
//! record written at the same offset may leave stale data there.

use std::io::Read;

use crate::common::{Error, NodeOffset, Result};

use super::node::{InternalNode, LeafNode, Node, NodeTag};

/// Encoded length of `node`, tag byte included.
pub fn encoded_len(node: &Node) -> usize {
    match node {
        Node::Leaf(leaf) => 1 + 4 + 16 * leaf.keys.len(),
        Node::Internal(internal) => 1 + 4 + 16 * internal.keys.len() + 8,
    }
}

/// Encode `node` as a complete record, tag byte first.
pub fn encode(node: &Node) -> Vec<u8> {
    let mut buf = Vec::with_capacity(encoded_len(node));
    buf.push(node.tag() as u8);
    buf.extend_from_slice(&(node.len() as u32).to_be_bytes());

    match node {
        Node::Leaf(leaf) => {
            for (key, value) in leaf.keys.iter().zip(&leaf.values) {
                buf.extend_from_slice(&key.to_be_bytes());
                buf.extend_from_slice(&value.to_be_bytes());
            }
        }
        Node::Internal(internal) => {
            for (key, child) in internal.keys.iter().zip(&internal.children) {
                buf.extend_from_slice(&key.to_be_bytes());
                buf.extend_from_slice(&child.0.to_be_bytes());
            }
            if let Some(last) = internal.children.last() {
                buf.extend_from_slice(&last.0.to_be_bytes());
            }
        }
    }

    buf
}

/// Decode the record body that follows a tag byte already read from `reader`.
///
/// `max_keys` bounds the count field; a larger count means the bytes are
/// not a node record.
///
/// # Errors
/// - `Error::CorruptNode` if the count is out of range, or an internal node
///   has no keys (the image of a slot that was allocated but never written)
/// - `Error::Io` if the reader ends before the declared count
pub fn decode_body<R: Read>(
    tag: NodeTag,
    offset: NodeOffset,
    reader: &mut R,
    max_keys: usize,
) -> Result<Node> {
    let count = read_u32(reader)? as usize;
    if count > max_keys {
        return Err(Error::CorruptNode {
            offset: offset.0,
            reason: "key count exceeds fan-out",
        });
    }

    match tag {
        NodeTag::Leaf => {
            let mut leaf = LeafNode::new(offset);
            leaf.keys.reserve(count);
            leaf.values.reserve(count);
            for _ in 0..count {
                leaf.keys.push(read_i64(reader)?);
                leaf.values.push(read_i64(reader)?);
            }
            Ok(Node::Leaf(leaf))
        }
        NodeTag::Internal => {
            if count == 0 {
                return Err(Error::CorruptNode {
                    offset: offset.0,
                    reason: "internal node without keys",
                });
            }
            let mut keys = Vec::with_capacity(count);
            let mut children = Vec::with_capacity(count + 1);
            for _ in 0..count {
                keys.push(read_i64(reader)?);
                children.push(NodeOffset::new(read_u64(reader)?));
            }
            children.push(NodeOffset::new(read_u64(reader)?));
            Ok(Node::Internal(InternalNode {
                offset,
                keys,
                children,
            }))
        }
    }
}

/// Decode a complete record, tag byte included.
pub fn decode<R: Read>(offset: NodeOffset, reader: &mut R, max_keys: usize) -> Result<Node> {
    let mut tag = [0u8; 1];
    reader.read_exact(&mut tag)?;
    let tag = NodeTag::from_u8(tag[0]).ok_or(Error::CorruptNode {
        offset: offset.0,
        reason: "unknown node tag",
    })?;
    decode_body(tag, offset, reader, max_keys)
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

fn read_u64<R: Read>(reader: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_be_bytes(buf))
}

fn read_i64<R: Read>(reader: &mut R) -> Result<i64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(i64::from_be_bytes(buf))
}
