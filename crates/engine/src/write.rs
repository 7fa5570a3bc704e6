//! Write path: `write()` and the internal `flush()`.
//!
//! Every mutation is appended to the WAL first, then applied to the
//! memtable. Once the memtable holds `memtable_threshold` entries the
//! engine rolls it into a new level-0 SSTable and resets it.

use anyhow::{ensure, Context, Result};

use crate::{Engine, MAX_VALUE_SIZE};

impl Engine {
    /// Persists `key -> value`.
    ///
    /// # Ordering
    ///
    /// 1. Validate the key and the value size.
    /// 2. Append to the WAL (durability precedes visibility).
    /// 3. Insert into the memtable.
    /// 4. Bump the write counter.
    /// 5. Flush if the memtable has reached the threshold.
    ///
    /// # Errors
    ///
    /// Rejects empty keys, keys containing `':'` or `','` (reserved by the
    /// WAL line format and the sparse-index encoding), and values larger
    /// than [`MAX_VALUE_SIZE`]. WAL and flush failures propagate; a failed
    /// flush leaves the memtable and WAL untouched so the entries remain
    /// recoverable.
    pub fn write(&mut self, key: &str, value: &[u8]) -> Result<()> {
        ensure!(!key.is_empty(), "key must not be empty");
        ensure!(
            !key.contains([':', ',']),
            "key may not contain ':' or ',': {:?}",
            key
        );
        ensure!(
            value.len() <= MAX_VALUE_SIZE,
            "value size exceeds maximum allowed size of {} bytes",
            MAX_VALUE_SIZE
        );

        self.wal
            .append(key, value)
            .context("wal append failed")?;

        self.mem.append(key, value);
        self.seq += 1;

        tracing::trace!(key, value_len = value.len(), "write buffered");

        if self.mem.size() >= self.config.memtable_threshold {
            self.flush()?;
        }

        Ok(())
    }

    /// Rolls the memtable into a new SSTable.
    ///
    /// The manager builds the bloom filter and sparse index during its
    /// flush walk and publishes the table only once the file is fully on
    /// disk. The WAL is truncated and the memtable reset strictly after
    /// that point.
    pub(crate) fn flush(&mut self) -> Result<()> {
        let entries = self.mem.size();
        let table = self.manager.add_sstable();
        let name = table.name.clone();

        self.manager
            .flush(table, &self.mem)
            .context("memtable flush failed")?;

        // The entries are now durable in the SSTable; the WAL records for
        // them are obsolete.
        self.wal.truncate().context("wal truncate failed")?;
        self.mem.reset();

        tracing::debug!(table = %name, entries, "memtable flushed");
        Ok(())
    }
}
