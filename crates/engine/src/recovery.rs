//! Cold-start recovery.
//!
//! On open, the WAL is replayed into a fresh memtable so that writes
//! accepted before a crash (or a plain restart) remain visible. SSTable
//! discovery itself lives in [`sstable::TableManager::load_existing`]; this
//! module only owns the WAL side.

use std::path::Path;

use anyhow::{Context, Result};

use memtable::Memtable;

/// Replays the WAL at `path` into `mem`, returning the number of entries
/// applied. A missing file is a fresh start (zero entries).
pub(crate) fn replay_wal(path: &Path, mem: &mut Memtable) -> Result<usize> {
    let mut replayed = 0usize;
    wal::replay(path, |key, value| {
        mem.append(key, value);
        replayed += 1;
    })
    .context("failed to replay wal")?;
    Ok(replayed)
}
