//! indexdb - a toy single-file database indexed by a disk-backed B+ tree.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            indexdb                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Shell (shell) + Database (record/)          │   │
//! │  │   add / show / update / load / merge over 64-byte rows   │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                 insert(id, offset) ↓ ↑ search(id)               │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                Index facade (index/)                     │   │
//! │  │     BPlusTree: in-memory root, split-on-overflow         │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                  read(offset) ↓ ↑ write(node)                   │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │           Storage Layer (storage/)                       │   │
//! │  │   NodeStore: root pointer + node slots in one file       │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (NodeOffset, Error, config)
//! - [`storage`] - Index file I/O
//! - [`index`] - The B+ tree and its facade
//! - [`record`] - Record files and the database built on the index
//! - [`shell`] - Interactive command loop
//!
//! # Quick Start
//! ```no_run
//! use indexdb::{Database, StudentRecord};
//!
//! let mut db = Database::open("school")?;
//! db.add_record(&StudentRecord::new(1001, "Hopper", "Grace", "A"))?;
//! assert_eq!(db.find_record(1001)?.map(|r| r.grade), Some("A".to_string()));
//! db.close()?;
//! # Ok::<(), indexdb::Error>(())
//! ```

pub mod common;
pub mod index;
pub mod record;
pub mod shell;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::{FlushPolicy, IndexConfig, DEFAULT_FAN_OUT, RECORD_SIZE};
pub use common::{Error, NodeOffset, Result};

pub use index::btree::{BPlusTree, Node};
pub use index::Index;
pub use record::{Database, LoadReport, RecordFile, StudentRecord};
pub use shell::Shell;
pub use storage::{NodeStore, StatsSnapshot, StoreStats};
