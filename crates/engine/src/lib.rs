//! # Engine - CobaltKV Storage Engine
//!
//! The central orchestrator that ties together the [`memtable`], [`wal`],
//! and [`sstable`] crates into a complete LSM-tree key-value store.
//!
//! ## Architecture
//!
//! ```text
//! Client
//!   |
//!   v
//! ┌───────────────────────────────────────────────┐
//! │                   ENGINE                      │
//! │                                               │
//! │ write.rs → WAL append → Memtable insert       │
//! │              |                                │
//! │              |  (entry count >= threshold?)   │
//! │              |            yes                 │
//! │              v                                │
//! │           flush() → new level-0 SSTable       │
//! │                     (bloom + sparse index     │
//! │                      built during the walk)   │
//! │                                               │
//! │ read.rs → Memtable → newest admitting SSTable │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Module Responsibilities
//!
//! | Module       | Purpose                                            |
//! |--------------|----------------------------------------------------|
//! | `lib.rs`     | `Engine` struct, constructor, accessors, `Debug`   |
//! | [`config`]   | options struct + builder, `COBALT_DATA_DIR` fallback |
//! | `recovery`   | WAL replay into a fresh memtable, SSTable discovery |
//! | `write`      | `write()` and the internal `flush()`               |
//! | `read`       | `read()` and `iter()`                              |
//!
//! ## Crash Safety
//!
//! Every write is appended to the WAL **before** the memtable update. The
//! WAL is truncated only **after** a successful flush, and SSTables are
//! written atomically (temp file + rename), so at any instant either the
//! WAL or an SSTable carries each acknowledged write.

mod read;
mod recovery;
mod write;

pub mod config;

pub use config::{Config, ConfigBuilder, DATA_DIR_ENV};

use std::fs;

use anyhow::{Context, Result};

use memtable::Memtable;
use sstable::TableManager;
use wal::Wal;

/// Maximum allowed value size in bytes.
pub const MAX_VALUE_SIZE: usize = 1024;

/// The storage engine façade: the only surface external components consume.
///
/// Writes take `&mut self` and must be serialized by the caller; reads take
/// `&self` and may run concurrently against the same snapshot. Wrapping the
/// engine in an `RwLock` yields exactly the single-writer/multi-reader
/// model the internals assume.
pub struct Engine {
    pub(crate) config: Config,
    pub(crate) wal: Wal,
    pub(crate) mem: Memtable,
    pub(crate) manager: TableManager,
    /// Count of writes accepted by this instance.
    pub(crate) seq: u64,
}

impl Engine {
    /// Opens an engine rooted at the configured output directory,
    /// recovering any state left by earlier runs.
    ///
    /// # Recovery Steps
    ///
    /// 1. Create the output directory if it does not exist.
    /// 2. Replay `wal.log` into a fresh memtable.
    /// 3. Open the WAL for appending.
    /// 4. Discover existing SSTables under `sstables/level_*`.
    pub fn open(config: Config) -> Result<Self> {
        fs::create_dir_all(&config.output_dir).with_context(|| {
            format!("failed to create data directory {}", config.output_dir.display())
        })?;

        let wal_path = config.output_dir.join(wal::WAL_FILE_NAME);

        // Replay before opening the writer so the append handle starts at
        // the recovered end of file.
        let mut mem = Memtable::new();
        let replayed = recovery::replay_wal(&wal_path, &mut mem)?;

        let wal = Wal::open(&wal_path).context("failed to open wal")?;

        let mut manager = TableManager::new(&config.output_dir, config.bloom_filter_bits);
        let loaded = manager.load_existing()?;

        if replayed > 0 || loaded > 0 {
            tracing::info!(
                replayed_entries = replayed,
                sstables = loaded,
                "recovered engine state"
            );
        }

        Ok(Self {
            config,
            wal,
            mem,
            manager,
            seq: 0,
        })
    }

    /// Number of writes accepted since this instance was opened.
    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Number of entries currently buffered in the memtable.
    #[must_use]
    pub fn memtable_size(&self) -> usize {
        self.mem.size()
    }

    /// Number of SSTables across all levels.
    #[must_use]
    pub fn sstable_count(&self) -> usize {
        self.manager.table_count()
    }

    /// The configured flush threshold (entry count).
    #[must_use]
    pub fn memtable_threshold(&self) -> usize {
        self.config.memtable_threshold
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("output_dir", &self.config.output_dir)
            .field("seq", &self.seq)
            .field("memtable_size", &self.mem.size())
            .field("memtable_threshold", &self.config.memtable_threshold)
            .field("sstable_count", &self.manager.table_count())
            .finish()
    }
}

#[cfg(test)]
mod tests;
