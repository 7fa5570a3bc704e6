//! One persisted SSTable artifact.
//!
//! An [`SsTable`] pairs the on-disk file with the in-memory structures
//! needed to read it: the bloom filter for membership probes and the sparse
//! index for record offsets. The file is written once (atomically) and
//! never mutated afterwards.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Seek, SeekFrom, Write};
use std::path::PathBuf;
use std::time::SystemTime;

use anyhow::{anyhow, Context, Result};

use bloom::BloomFilter;

use crate::codec::{self, Record};
use crate::sparse::SparseIndex;

/// Handle to one immutable on-disk table.
#[derive(Debug)]
pub struct SsTable {
    /// Level within the LSM hierarchy. Flushes always produce level 0;
    /// higher levels are reserved for compaction.
    pub level: u32,
    /// Zero-padded four-digit ordinal, unique within the level.
    pub name: String,
    /// Full path of the `.bin` file.
    pub path: PathBuf,
    /// Membership filter over every key in the table.
    pub bloom: BloomFilter,
    /// Key -> data-block offset for every key in the table.
    pub sparse: SparseIndex,
    pub created_at: SystemTime,
    /// Process-monotonic creation ordinal; newer tables shadow older ones.
    pub seq: u64,
}

impl SsTable {
    /// Writes the complete file image to disk.
    ///
    /// The bytes go to a `.tmp` sibling first, are fsynced, and are then
    /// renamed into place, so a crash mid-write never leaves a partial
    /// table at the published path.
    pub fn write(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let tmp_path = self.path.with_extension("bin.tmp");
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)
            .with_context(|| format!("failed to create {}", tmp_path.display()))?;

        file.write_all(bytes)?;
        file.flush()?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("failed to publish {}", self.path.display()))?;
        Ok(())
    }

    /// Point read: decodes the single record for `key`.
    ///
    /// Seeks straight to `metadata_size + sparse[key]` -- the sparse index
    /// stores offsets relative to the data block, the header size bridges
    /// to the file origin.
    pub fn read_record(&self, key: &str) -> Result<Record> {
        let offset = self
            .sparse
            .get(key)
            .ok_or_else(|| anyhow!("key not found: {}", key))?;

        let file = File::open(&self.path)
            .with_context(|| format!("failed to open sstable {}", self.path.display()))?;
        let mut reader = BufReader::new(file);

        let metadata_offset = codec::metadata_size(&self.bloom, &self.sparse) as u64;
        reader.seek(SeekFrom::Start(metadata_offset + offset as u64))?;

        codec::read_record(&mut reader)
            .with_context(|| format!("failed to decode record {:?} in {}", key, self.name))
    }

    /// Every key in the table, ascending -- the table's natural order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sparse.keys()
    }

    /// Number of records in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sparse.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sparse.is_empty()
    }
}
