//! Index facade - one B+ tree in one file.

use std::path::Path;

use crate::common::config::IndexConfig;
use crate::common::Result;
use crate::index::btree::BPlusTree;
use crate::storage::{NodeStore, StatsSnapshot};

/// A key → offset index stored in a single file.
///
/// This is the whole surface the record store sees: `insert`, `search`
/// and `close`. Keys are record ids, values are byte offsets into the
/// record file; the index never interprets them.
///
/// # Example
/// ```no_run
/// use indexdb::Index;
///
/// let mut index = Index::open("students.index")?;
/// index.insert(1001, 0)?;
/// assert_eq!(index.search(1001)?, Some(0));
/// assert_eq!(index.search(1002)?, None);
/// index.close()?;
/// # Ok::<(), indexdb::Error>(())
/// ```
pub struct Index {
    tree: BPlusTree,
}

impl Index {
    /// Open or create the index at `path` with the default configuration.
    ///
    /// An empty file is initialized with a single empty leaf as root; a
    /// non-empty one is loaded through its root pointer.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, IndexConfig::default())
    }

    /// Open or create the index at `path` with `config`.
    ///
    /// The fan-out is a property of the file: reopen an index with the
    /// fan-out it was created with. A mismatch that changes the slot size
    /// in a way the file length reveals fails with `Error::SlotMismatch`.
    pub fn open_with<P: AsRef<Path>>(path: P, config: IndexConfig) -> Result<Self> {
        let store = NodeStore::open(path, config)?;
        Ok(Self {
            tree: BPlusTree::open(store)?,
        })
    }

    /// Map `key` to `value`. A previous value for `key` is shadowed.
    pub fn insert(&mut self, key: i64, value: i64) -> Result<()> {
        self.tree.insert(key, value)
    }

    /// Value last inserted under `key`, or `None`.
    pub fn search(&mut self, key: i64) -> Result<Option<i64>> {
        self.tree.search(key)
    }

    /// Flush the file to disk and release it.
    pub fn close(mut self) -> Result<()> {
        self.tree.sync()
    }

    /// Current I/O counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.tree.stats().snapshot()
    }

    /// Underlying tree, for inspection.
    pub fn tree(&mut self) -> &mut BPlusTree {
        &mut self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::FlushPolicy;
    use tempfile::tempdir;

    #[test]
    fn test_open_insert_search() {
        let dir = tempdir().unwrap();
        let mut index = Index::open(dir.path().join("test.index")).unwrap();

        index.insert(42, 128).unwrap();
        assert_eq!(index.search(42).unwrap(), Some(128));
        assert_eq!(index.search(43).unwrap(), None);
    }

    #[test]
    fn test_close_and_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.index");

        {
            let mut index = Index::open(&path).unwrap();
            for key in 0..50 {
                index.insert(key, key * 64).unwrap();
            }
            index.close().unwrap();
        }

        let mut index = Index::open(&path).unwrap();
        for key in 0..50 {
            assert_eq!(index.search(key).unwrap(), Some(key * 64));
        }
    }

    #[test]
    fn test_open_with_config() {
        let dir = tempdir().unwrap();
        let config = IndexConfig::default()
            .with_fan_out(6)
            .with_flush_policy(FlushPolicy::Legacy);
        let mut index = Index::open_with(dir.path().join("test.index"), config).unwrap();

        assert_eq!(index.tree().config(), &config);
    }

    #[test]
    fn test_reopen_with_other_fan_out() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.index");

        {
            let mut index = Index::open(&path).unwrap();
            for key in 0..4 {
                index.insert(key, key).unwrap();
            }
            index.close().unwrap();
        }

        let config = IndexConfig::default().with_fan_out(8);
        assert!(matches!(
            Index::open_with(&path, config),
            Err(crate::common::Error::SlotMismatch { .. })
        ));
    }

    #[test]
    fn test_stats_snapshot() {
        let dir = tempdir().unwrap();
        let mut index = Index::open(dir.path().join("test.index")).unwrap();
        let before = index.stats();

        index.insert(1, 1).unwrap();

        assert_eq!(index.stats().since(&before).nodes_written, 1);
    }
}
