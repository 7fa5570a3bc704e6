//! Engine configuration.
//!
//! A plain options struct with defaulted fields, populated through a
//! builder. The only required setting is the output directory; when it is
//! not given explicitly the builder falls back to the `COBALT_DATA_DIR`
//! environment variable and fails construction if that is unset too.

use std::path::PathBuf;

use anyhow::{anyhow, ensure, Result};

/// Environment variable selecting the default data root.
pub const DATA_DIR_ENV: &str = "COBALT_DATA_DIR";

/// Memtable entry count that triggers a flush.
pub const DEFAULT_MEMTABLE_THRESHOLD: usize = 1000;

/// Bloom filter size, in bits, for each new SSTable.
pub const DEFAULT_BLOOM_FILTER_BITS: usize = 10_000;

/// Resolved engine options.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory for the WAL and the `sstables/` tree.
    pub output_dir: PathBuf,
    /// Flush once the memtable holds this many entries.
    pub memtable_threshold: usize,
    /// Bits per SSTable bloom filter.
    pub bloom_filter_bits: usize,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    output_dir: Option<PathBuf>,
    memtable_threshold: Option<usize>,
    bloom_filter_bits: Option<usize>,
}

impl ConfigBuilder {
    /// Sets the data root explicitly, overriding `COBALT_DATA_DIR`.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Sets the memtable flush threshold (entry count).
    pub fn memtable_threshold(mut self, entries: usize) -> Self {
        self.memtable_threshold = Some(entries);
        self
    }

    /// Sets the bloom filter size per SSTable, in bits.
    pub fn bloom_filter_bits(mut self, bits: usize) -> Self {
        self.bloom_filter_bits = Some(bits);
        self
    }

    /// Resolves the configuration.
    ///
    /// # Errors
    ///
    /// Fails when no output directory was set and `COBALT_DATA_DIR` is
    /// unset, or when a threshold/bloom size of zero is requested.
    pub fn build(self) -> Result<Config> {
        let output_dir = match self.output_dir {
            Some(dir) => dir,
            None => std::env::var_os(DATA_DIR_ENV)
                .map(PathBuf::from)
                .ok_or_else(|| {
                    anyhow!(
                        "{} environment variable is not set and no output directory was given",
                        DATA_DIR_ENV
                    )
                })?,
        };

        let memtable_threshold = self.memtable_threshold.unwrap_or(DEFAULT_MEMTABLE_THRESHOLD);
        let bloom_filter_bits = self.bloom_filter_bits.unwrap_or(DEFAULT_BLOOM_FILTER_BITS);

        ensure!(memtable_threshold > 0, "memtable threshold must be > 0");
        ensure!(bloom_filter_bits > 0, "bloom filter size must be > 0");

        Ok(Config {
            output_dir,
            memtable_threshold,
            bloom_filter_bits,
        })
    }
}
