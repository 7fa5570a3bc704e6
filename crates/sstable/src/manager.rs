//! Live-set bookkeeping for SSTables.
//!
//! The manager owns every published table, partitioned by level, hands out
//! process-monotonic sequence numbers, performs the memtable flush walk,
//! and routes point reads to the newest candidate table.

use std::collections::BTreeMap;
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};

use bloom::BloomFilter;
use memtable::Memtable;

use crate::codec::{self, Record};
use crate::sparse::SparseIndex;
use crate::table::SsTable;

/// Directory under the engine output dir holding all levels.
pub const SSTABLES_DIR: &str = "sstables";

/// Owns the live set of SSTables and the flush path that creates them.
#[derive(Debug)]
pub struct TableManager {
    /// level -> tables in creation order (oldest first).
    levels: BTreeMap<u32, Vec<SsTable>>,
    /// `{output_dir}/sstables`.
    dir: PathBuf,
    next_seq: u64,
    bloom_bits: usize,
}

impl TableManager {
    /// Creates a manager rooted at `{output_dir}/sstables`. New tables get
    /// bloom filters of `bloom_bits` bits.
    #[must_use]
    pub fn new(output_dir: &Path, bloom_bits: usize) -> Self {
        Self {
            levels: BTreeMap::new(),
            dir: output_dir.join(SSTABLES_DIR),
            next_seq: 0,
            bloom_bits,
        }
    }

    /// File path for a table: `sstables/level_{level}/{name}.bin`.
    #[must_use]
    pub fn file_path(&self, name: &str, level: u32) -> PathBuf {
        self.dir
            .join(format!("level_{}", level))
            .join(format!("{}.bin", name))
    }

    /// Allocates a fresh, empty, **unpublished** level-0 table handle.
    ///
    /// The table becomes visible to readers only when [`flush`] succeeds
    /// and publishes it, so a failed flush leaves no half-written table in
    /// the live set.
    ///
    /// [`flush`]: TableManager::flush
    pub fn add_sstable(&mut self) -> SsTable {
        let level = 0;
        let name = format!("{:04}", self.level_len(level) + 1);
        let path = self.file_path(&name, level);
        let seq = self.next_seq;
        self.next_seq += 1;

        SsTable {
            level,
            name,
            path,
            bloom: BloomFilter::new(self.bloom_bits),
            sparse: SparseIndex::new(),
            created_at: SystemTime::now(),
            seq,
        }
    }

    /// Serializes the memtable into `table` and publishes it.
    ///
    /// Walks the memtable in key order with a running byte offset starting
    /// at zero: each entry is recorded, added to the bloom filter, indexed
    /// at the current offset, and the offset advances by
    /// [`codec::record_size`]. The resulting file image is then written
    /// atomically. Any error propagates with nothing published.
    pub fn flush(&mut self, mut table: SsTable, memtable: &Memtable) -> Result<()> {
        let mut records = Vec::with_capacity(memtable.size());
        let mut offset: i64 = 0;

        for node in memtable.iter() {
            table.bloom.add(&node.key);
            table.sparse.update(&node.key, offset)?;
            offset += codec::record_size(&node.key, &node.value) as i64;

            records.push(Record {
                key: node.key.clone(),
                value: node.value.clone(),
                timestamp: node.timestamp,
                tombstone: false,
            });
        }

        let bytes = codec::encode_table(&table.bloom, &table.sparse, &records)?;
        table.write(&bytes)?;

        self.levels.entry(table.level).or_default().push(table);
        Ok(())
    }

    /// Returns the newest level-0 table whose bloom filter admits `key`,
    /// or `None` when every filter rejects it.
    #[must_use]
    pub fn find_by_key(&self, key: &str) -> Option<&SsTable> {
        self.levels
            .get(&0)?
            .iter()
            .filter(|table| table.bloom.contains(key))
            .max_by_key(|table| table.seq)
    }

    /// Reads one record from `table`.
    pub fn read(&self, table: &SsTable, key: &str) -> Result<Record> {
        table.read_record(key)
    }

    /// All published tables, levels ascending, oldest first within a level.
    pub fn tables(&self) -> impl Iterator<Item = &SsTable> {
        self.levels.values().flatten()
    }

    /// Number of published tables across all levels.
    #[must_use]
    pub fn table_count(&self) -> usize {
        self.levels.values().map(Vec::len).sum()
    }

    /// Number of published tables at `level`.
    #[must_use]
    pub fn level_len(&self, level: u32) -> usize {
        self.levels.get(&level).map_or(0, Vec::len)
    }

    /// Discovers tables persisted by earlier runs.
    ///
    /// Scans `sstables/level_*/ *.bin` in name order, decodes each header
    /// (bloom filter + sparse index) and republishes the handles with
    /// fresh ascending sequence numbers, preserving creation order.
    /// Returns the number of tables loaded.
    pub fn load_existing(&mut self) -> Result<usize> {
        if !self.dir.exists() {
            return Ok(0);
        }

        let mut level_dirs: Vec<(u32, PathBuf)> = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if let Some(level) = name.strip_prefix("level_").and_then(|s| s.parse().ok()) {
                level_dirs.push((level, path));
            }
        }
        level_dirs.sort_by_key(|(level, _)| *level);

        let mut loaded = 0;
        for (level, dir) in level_dirs {
            let mut files: Vec<PathBuf> = fs::read_dir(&dir)?
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().is_some_and(|ext| ext == "bin"))
                .collect();
            files.sort(); // names are zero-padded ordinals

            for path in files {
                let table = self.load_table(level, &path)?;
                self.levels.entry(level).or_default().push(table);
                loaded += 1;
            }
        }

        Ok(loaded)
    }

    fn load_table(&mut self, level: u32, path: &Path) -> Result<SsTable> {
        let file = fs::File::open(path)
            .with_context(|| format!("failed to open sstable {}", path.display()))?;
        let created_at = file
            .metadata()
            .ok()
            .and_then(|m| m.modified().ok())
            .unwrap_or_else(SystemTime::now);

        let mut reader = BufReader::new(file);
        let (bloom, sparse) = codec::read_metadata(&mut reader)
            .with_context(|| format!("failed to decode header of {}", path.display()))?;

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let seq = self.next_seq;
        self.next_seq += 1;

        Ok(SsTable {
            level,
            name,
            path: path.to_path_buf(),
            bloom,
            sparse,
            created_at,
            seq,
        })
    }
}
