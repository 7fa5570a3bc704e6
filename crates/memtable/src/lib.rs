//! # Memtable
//!
//! The in-memory ordered buffer of recent writes.
//!
//! Every write lands here (after the WAL append) and stays until the engine
//! flushes the buffered entries to an SSTable. Entries are kept sorted by
//! key in a left-leaning red-black tree, so the flush walk emits records in
//! exactly the order the SSTable file needs them.
//!
//! The memtable itself never decides to flush: it only reports its size and
//! the engine compares that against the configured threshold.

mod tree;

pub use tree::{InorderIter, Node, RbTree};

use std::time::{SystemTime, UNIX_EPOCH};

/// Ordered write buffer; at most one entry per key, later writes overwrite.
#[derive(Debug, Default)]
pub struct Memtable {
    tree: RbTree,
}

impl Memtable {
    #[must_use]
    pub fn new() -> Self {
        Self { tree: RbTree::new() }
    }

    /// Builds a memtable from `key:value` pairs joined by commas, e.g.
    /// `"aaa:123,bbb:456"`. Pairs without a `':'` separator are skipped.
    #[must_use]
    pub fn from_kv_pairs(kv: &str) -> Self {
        let mut mem = Self::new();
        for pair in kv.split(',') {
            if let Some((key, value)) = pair.split_once(':') {
                mem.append(key, value.as_bytes());
            }
        }
        mem
    }

    /// Inserts or overwrites `key`, stamping the entry with the current
    /// unix timestamp.
    pub fn append(&mut self, key: &str, value: &[u8]) {
        self.tree
            .insert(key.to_string(), value.to_vec(), unix_timestamp());
    }

    /// Returns the buffered value for `key`, if any.
    #[must_use]
    pub fn read(&self, key: &str) -> Option<&[u8]> {
        self.tree.get(key).map(|node| node.value.as_slice())
    }

    /// Number of distinct buffered keys.
    #[must_use]
    pub fn size(&self) -> usize {
        self.tree.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Entry with the smallest key.
    #[must_use]
    pub fn first(&self) -> Option<&Node> {
        self.tree.first()
    }

    /// Entry with the largest key.
    #[must_use]
    pub fn last(&self) -> Option<&Node> {
        self.tree.last()
    }

    /// Replaces the tree with a fresh empty one. Called by the engine after
    /// a successful flush, never on a failed one.
    pub fn reset(&mut self) {
        self.tree = RbTree::new();
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> InorderIter<'_> {
        self.tree.iter()
    }
}

fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
