//! Index structures.
//!
//! - [`btree`] - The disk-backed B+ tree
//! - [`Index`] - File-level handle used by the record store

pub mod btree;
mod facade;

pub use facade::Index;
