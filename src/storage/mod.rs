//! Storage layer - index file I/O.
//!
//! This module handles persistent storage of the tree:
//! - [`NodeStore`] - Offset-addressed node reads and writes
//! - [`StoreStats`] - I/O counters

mod node_store;
mod stats;

pub use node_store::NodeStore;
pub use stats::{StatsSnapshot, StoreStats};
