//! SSTable dump tool.
//!
//! Walks a data directory's `sstables/` tree, fully decodes every `.bin`
//! file and prints its header stats and records. Intended for debugging
//! on-disk state:
//!
//! ```text
//! $ dump /var/lib/cobalt
//! level_0/0001.bin: bloom 10000 bits (27 set), 3 indexed keys
//!   a @ 0: 4 bytes, ts 1754102400
//!   ...
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use sstable::codec;

fn main() -> Result<()> {
    let data_dir = match std::env::args().nth(1) {
        Some(dir) => PathBuf::from(dir),
        None => std::env::var_os(engine::DATA_DIR_ENV)
            .map(PathBuf::from)
            .context("usage: dump <data-dir> (or set COBALT_DATA_DIR)")?,
    };

    let sstables_dir = data_dir.join("sstables");
    if !sstables_dir.exists() {
        bail!("no sstables directory under {}", data_dir.display());
    }

    let mut level_dirs: Vec<PathBuf> = std::fs::read_dir(&sstables_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    level_dirs.sort();

    let mut total = 0usize;
    for level_dir in level_dirs {
        let mut files: Vec<PathBuf> = std::fs::read_dir(&level_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "bin"))
            .collect();
        files.sort();

        for path in files {
            dump_table(&sstables_dir, &path)?;
            total += 1;
        }
    }

    if total == 0 {
        println!("no sstable files found under {}", sstables_dir.display());
    } else {
        println!("{} table(s) dumped", total);
    }
    Ok(())
}

fn dump_table(root: &Path, path: &Path) -> Result<()> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let table = codec::read_table(&mut reader)
        .with_context(|| format!("failed to decode {}", path.display()))?;

    let display_name = path
        .strip_prefix(root)
        .unwrap_or(path)
        .display();
    println!(
        "{}: bloom {} bits ({} set), {} indexed keys",
        display_name,
        table.bloom.size(),
        table.bloom.popcount(),
        table.sparse.len()
    );

    for record in &table.records {
        let offset = table.sparse.get(&record.key);
        println!(
            "  {} @ {}: {} bytes, ts {}{}",
            record.key,
            offset.map_or_else(|| "?".to_string(), |o| o.to_string()),
            record.value.len(),
            record.timestamp,
            if record.tombstone { ", tombstone" } else { "" }
        );
    }
    Ok(())
}
