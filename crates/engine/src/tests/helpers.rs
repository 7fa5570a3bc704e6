use std::fs;
use std::path::Path;

use crate::{Config, Engine};

/// Opens an engine rooted at `dir` with a small bloom filter and the given
/// entry threshold.
pub fn test_engine(dir: &Path, threshold: usize) -> Engine {
    let config = Config::builder()
        .output_dir(dir)
        .memtable_threshold(threshold)
        .bloom_filter_bits(1000)
        .build()
        .unwrap();
    Engine::open(config).unwrap()
}

/// Counts `.bin` files under `{dir}/sstables/level_0`.
pub fn count_level0_files(dir: &Path) -> usize {
    let level_dir = dir.join("sstables").join("level_0");
    if !level_dir.exists() {
        return 0;
    }
    fs::read_dir(level_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|s| s.to_str())
                .map(|ext| ext == "bin")
                .unwrap_or(false)
        })
        .count()
}
