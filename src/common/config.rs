//! Configuration for the index file and the record store.
//!
//! The constants describe the on-disk format and never change at runtime.
//! [`IndexConfig`] carries the knobs that may differ between two indexes
//! opened by the same process.

use crate::common::{Error, Result};

/// Default fan-out bound `M`: a node splits as soon as it holds this many keys.
pub const DEFAULT_FAN_OUT: usize = 4;

/// Smallest fan-out that still leaves a key on both sides of an internal split.
pub const MIN_FAN_OUT: usize = 3;

/// Bytes reserved at offset 0 of the index file for the root pointer.
pub const ROOT_POINTER_SIZE: u64 = 8;

/// Size of one fixed-width student record in the flat record file.
pub const RECORD_SIZE: usize = 64;

/// Which nodes an insert writes back to the index file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FlushPolicy {
    /// Write only the root and, when the root split, its new right sibling.
    /// Every other mutated node, the left half of a root split included,
    /// keeps its old on-disk image, so its changes are lost on the next read.
    Legacy,
    /// Write every node the insert mutated plus every new split sibling.
    #[default]
    Full,
}

/// Per-index configuration.
///
/// # Example
/// ```
/// use indexdb::common::config::{FlushPolicy, IndexConfig};
///
/// let config = IndexConfig::default().with_fan_out(8);
/// assert_eq!(config.fan_out, 8);
/// assert_eq!(config.flush_policy, FlushPolicy::Full);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexConfig {
    /// Fan-out bound `M`.
    pub fan_out: usize,
    /// Persistence behavior of `insert`.
    pub flush_policy: FlushPolicy,
}

impl IndexConfig {
    /// Default fan-out with [`FlushPolicy::Legacy`], for index files that
    /// must match the partial-flush layout.
    pub fn legacy() -> Self {
        Self {
            fan_out: DEFAULT_FAN_OUT,
            flush_policy: FlushPolicy::Legacy,
        }
    }

    /// Replace the fan-out bound.
    pub fn with_fan_out(mut self, fan_out: usize) -> Self {
        self.fan_out = fan_out;
        self
    }

    /// Replace the flush policy.
    pub fn with_flush_policy(mut self, flush_policy: FlushPolicy) -> Self {
        self.flush_policy = flush_policy;
        self
    }

    /// Check that the configuration describes a usable tree.
    ///
    /// # Errors
    /// Returns `Error::InvalidFanOut` if `fan_out < MIN_FAN_OUT`.
    pub fn validate(&self) -> Result<()> {
        if self.fan_out < MIN_FAN_OUT {
            return Err(Error::InvalidFanOut(self.fan_out));
        }
        Ok(())
    }

    /// Bytes reserved per node: the encoding of an internal node holding
    /// `fan_out - 1` keys, the largest record ever written.
    ///
    /// ```text
    /// flag(1) + count(4) + (M-1) × (key(8) + child(8)) + last child(8)
    /// ```
    pub fn slot_size(&self) -> u64 {
        13 + 16 * (self.fan_out as u64 - 1)
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            fan_out: DEFAULT_FAN_OUT,
            flush_policy: FlushPolicy::default(),
        }
    }
}
