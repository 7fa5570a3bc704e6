//! Read path: `read()` and `iter()`.
//!
//! Point lookups check the memtable first (freshest data), then ask the
//! manager for the newest SSTable whose bloom filter admits the key. Full
//! scans walk the memtable in key order, then every table, skipping keys
//! the memtable already produced.

use std::collections::HashSet;

use anyhow::{anyhow, Result};

use crate::Engine;

impl Engine {
    /// Looks up `key`, returning the exact bytes written.
    ///
    /// # Errors
    ///
    /// `sstable not found: {key}` when neither the memtable nor any
    /// bloom-admitting SSTable holds the key; decode errors from the
    /// admitting table propagate. The record's tombstone bit is ignored.
    pub fn read(&self, key: &str) -> Result<Vec<u8>> {
        if let Some(value) = self.mem.read(key) {
            tracing::trace!(key, "read served from memtable");
            return Ok(value.to_vec());
        }

        let table = self
            .manager
            .find_by_key(key)
            .ok_or_else(|| anyhow!("sstable not found: {}", key))?;

        let record = self.manager.read(table, key)?;
        tracing::trace!(key, table = %table.name, "read served from sstable");
        Ok(record.value)
    }

    /// Visits every entry: memtable first in ascending key order, then
    /// each SSTable's keys (levels ascending, oldest table first, each
    /// table in its natural key order), skipping keys the memtable already
    /// yielded.
    ///
    /// Iteration stops as soon as `visit` returns `false`. Records that
    /// fail to decode are skipped, keeping the scan going.
    pub fn iter<F>(&self, mut visit: F)
    where
        F: FnMut(&str, &[u8]) -> bool,
    {
        let mut yielded: HashSet<&str> = HashSet::new();

        for node in self.mem.iter() {
            yielded.insert(node.key.as_str());
            if !visit(&node.key, &node.value) {
                return;
            }
        }

        for table in self.manager.tables() {
            for key in table.keys() {
                if yielded.contains(key) {
                    continue;
                }
                match table.read_record(key) {
                    Ok(record) => {
                        if !visit(key, &record.value) {
                            return;
                        }
                    }
                    Err(error) => {
                        tracing::debug!(
                            table = %table.name,
                            key,
                            %error,
                            "skipping unreadable record during scan"
                        );
                    }
                }
            }
        }
    }
}
