//! Property tests for the B+ tree.

use std::collections::BTreeMap;

use indexdb::{BPlusTree, Index, IndexConfig, NodeStore};
use proptest::collection::{btree_set, vec};
use proptest::prelude::*;
use tempfile::tempdir;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Distinct keys inserted in any order are all found after reopening.
    #[test]
    fn prop_reopen_finds_every_key(
        keys in btree_set(any::<i64>(), 1..300)
            .prop_map(|set| set.into_iter().collect::<Vec<_>>())
            .prop_shuffle(),
    ) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prop.index");

        {
            let mut index = Index::open(&path).unwrap();
            for &key in &keys {
                index.insert(key, key.wrapping_mul(3)).unwrap();
            }
            index.close().unwrap();
        }

        let mut index = Index::open(&path).unwrap();
        for &key in &keys {
            prop_assert_eq!(index.search(key).unwrap(), Some(key.wrapping_mul(3)));
        }
    }

    /// Leaf order is key order, and every node stays under the fan-out.
    #[test]
    fn prop_entries_sorted_and_bounded(
        keys in vec(-1000i64..1000, 1..400),
        fan_out in 3usize..9,
    ) {
        let dir = tempdir().unwrap();
        let config = IndexConfig::default().with_fan_out(fan_out);
        let store = NodeStore::open(dir.path().join("prop.index"), config).unwrap();
        let mut tree = BPlusTree::open(store).unwrap();

        let mut latest = BTreeMap::new();
        for (i, &key) in keys.iter().enumerate() {
            tree.insert(key, i as i64).unwrap();
            latest.insert(key, i as i64);
        }

        let entries = tree.entries().unwrap();
        prop_assert_eq!(entries.len(), keys.len());
        prop_assert!(entries.windows(2).all(|w| w[0].0 <= w[1].0));

        for node in tree.nodes().unwrap() {
            prop_assert!(node.len() < fan_out);
        }

        // With duplicates, the newest value wins.
        for (&key, &value) in &latest {
            prop_assert_eq!(tree.search(key).unwrap(), Some(value));
        }
    }

    /// Searching twice without an insert in between gives the same answer.
    #[test]
    fn prop_search_is_idempotent(
        keys in btree_set(0i64..500, 0..100),
        probe in 0i64..500,
    ) {
        let dir = tempdir().unwrap();
        let mut index = Index::open(dir.path().join("prop.index")).unwrap();
        for &key in &keys {
            index.insert(key, key + 1).unwrap();
        }

        let first = index.search(probe).unwrap();
        let second = index.search(probe).unwrap();
        prop_assert_eq!(first, second);
        prop_assert_eq!(first.is_some(), keys.contains(&probe));
    }
}
