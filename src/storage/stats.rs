//! Node store statistics tracking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// I/O counters kept by a [`NodeStore`](super::NodeStore).
///
/// Every node the tree touches below the root is re-read from the file, so
/// `nodes_read` grows with each search and insert. The counters make that
/// visible to tests and to the shell.
///
/// # Example
/// ```
/// use indexdb::StoreStats;
/// use std::sync::atomic::Ordering;
///
/// let stats = StoreStats::new();
/// stats.nodes_read.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(stats.snapshot().nodes_read, 1);
/// ```
#[derive(Debug)]
pub struct StoreStats {
    /// Nodes decoded from the index file.
    pub nodes_read: AtomicU64,

    /// Node records written to the index file.
    pub nodes_written: AtomicU64,

    /// Bytes of node records written.
    pub bytes_written: AtomicU64,

    /// Fresh node slots reserved at end of file.
    pub allocations: AtomicU64,

    /// Writes of the root pointer at offset 0.
    pub root_pointer_writes: AtomicU64,
}

impl StoreStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self {
            nodes_read: AtomicU64::new(0),
            nodes_written: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            allocations: AtomicU64::new(0),
            root_pointer_writes: AtomicU64::new(0),
        }
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            nodes_read: self.nodes_read.load(Ordering::Relaxed),
            nodes_written: self.nodes_written.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            allocations: self.allocations.load(Ordering::Relaxed),
            root_pointer_writes: self.root_pointer_writes.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.nodes_read.store(0, Ordering::Relaxed);
        self.nodes_written.store(0, Ordering::Relaxed);
        self.bytes_written.store(0, Ordering::Relaxed);
        self.allocations.store(0, Ordering::Relaxed);
        self.root_pointer_writes.store(0, Ordering::Relaxed);
    }
}

impl Default for StoreStats {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time copy of [`StoreStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub nodes_read: u64,
    pub nodes_written: u64,
    pub bytes_written: u64,
    pub allocations: u64,
    pub root_pointer_writes: u64,
}

impl StatsSnapshot {
    /// Counter-wise difference `self - earlier`.
    pub fn since(&self, earlier: &StatsSnapshot) -> StatsSnapshot {
        StatsSnapshot {
            nodes_read: self.nodes_read - earlier.nodes_read,
            nodes_written: self.nodes_written - earlier.nodes_written,
            bytes_written: self.bytes_written - earlier.bytes_written,
            allocations: self.allocations - earlier.allocations,
            root_pointer_writes: self.root_pointer_writes - earlier.root_pointer_writes,
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ reads: {}, writes: {} ({} bytes), allocations: {}, root updates: {} }}",
            self.nodes_read,
            self.nodes_written,
            self.bytes_written,
            self.allocations,
            self.root_pointer_writes
        )
    }
}
