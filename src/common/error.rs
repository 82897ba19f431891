//! Error types for indexdb.

use thiserror::Error;

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in indexdb.
///
/// A key that is not in the index is not an error: lookups return
/// `Ok(None)` for a miss.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the index or record files.
    ///
    /// No rollback is attempted. After an I/O failure during insert the
    /// on-disk state of the index is unspecified.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A node offset points into the root-pointer header or past end of file.
    #[error("Invalid node offset {0}")]
    InvalidOffset(u64),

    /// Bytes at a node offset do not decode to a valid node.
    #[error("Corrupt node at offset {offset}: {reason}")]
    CorruptNode { offset: u64, reason: &'static str },

    /// An encoded node does not fit in the slot reserved for it.
    #[error("Node at offset {offset} needs {len} bytes but its slot holds {slot}")]
    NodeTooLarge { offset: u64, len: u64, slot: u64 },

    /// A non-empty index file too short to hold the root pointer.
    #[error("Index file is {0} bytes, too short for the root pointer")]
    TruncatedHeader(u64),

    /// The index file body is not a whole number of node slots, so it was
    /// created with a different fan-out.
    #[error("Index file of {len} bytes does not split into {slot}-byte node slots")]
    SlotMismatch { len: u64, slot: u64 },

    /// Fan-out bound below the supported minimum.
    #[error("Invalid fan-out {0}: must be at least 3")]
    InvalidFanOut(usize),

    /// An input line of a record load could not be parsed.
    #[error("Malformed record on line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    /// A record offset does not have a full record behind it.
    #[error("Record at offset {0} is truncated")]
    TruncatedRecord(u64),
}
