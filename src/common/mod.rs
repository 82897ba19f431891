//! Common types and utilities shared across indexdb.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants and [`IndexConfig`](config::IndexConfig)
//! - Error types
//! - Node addressing ([`NodeOffset`])

pub mod config;
pub mod error;
mod node_offset;

pub use error::{Error, Result};
pub use node_offset::NodeOffset;
