//! # Bloom Filter
//!
//! A space-efficient probabilistic data structure for set membership testing.
//!
//! A bloom filter can tell you with certainty that a key is **not** in the set
//! (no false negatives), but may occasionally report that a key **is** in the
//! set when it isn't (false positives).
//!
//! ## Usage in CobaltKV
//!
//! Each SSTable embeds a bloom filter built from its keys. During point
//! lookups the table manager checks the bloom filter first -- if it says
//! "not present", the SSTable is skipped entirely, avoiding an index lookup
//! and disk I/O.
//!
//! The filter is persisted inside the SSTable header as a string of `'0'`
//! and `'1'` characters, one per bit, so the on-disk rendering is exactly
//! `size` bytes long.
//!
//! ## Example
//!
//! ```rust
//! use bloom::BloomFilter;
//!
//! let mut bf = BloomFilter::new(1000);
//! bf.add("hello");
//! assert!(bf.contains("hello"));
//! ```

use std::fmt;
use std::str::FromStr;

/// A bloom filter backed by a bit vector with three salted hash probes.
///
/// All three probes derive from a single 32-bit FNV-1a hash by salting the
/// input: `h1 = H(key)`, `h2 = H(key ++ "salt")`, `h3 = H("prefix" ++ key)`.
/// Each index is taken modulo the filter size.
#[derive(Clone, PartialEq, Eq)]
pub struct BloomFilter {
    bits: Vec<bool>,
    size: usize,
}

impl BloomFilter {
    /// Creates an empty filter with `size` bits, all zero.
    ///
    /// # Panics
    ///
    /// Panics if `size` is 0 (every probe index is taken mod `size`).
    #[must_use]
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "bloom filter size must be > 0");
        Self {
            bits: vec![false; size],
            size,
        }
    }

    /// Reconstructs a filter from its `'0'`/`'1'` textual rendering.
    ///
    /// The resulting filter has one bit per input character. Returns an
    /// error for an empty string or any character other than `'0'`/`'1'`.
    pub fn from_bit_string(s: &str) -> Result<Self, ParseBloomError> {
        if s.is_empty() {
            return Err(ParseBloomError::Empty);
        }
        let mut bits = Vec::with_capacity(s.len());
        for (pos, ch) in s.chars().enumerate() {
            match ch {
                '0' => bits.push(false),
                '1' => bits.push(true),
                other => return Err(ParseBloomError::BadChar { pos, ch: other }),
            }
        }
        let size = bits.len();
        Ok(Self { bits, size })
    }

    /// Sets the three probe bits for `key`.
    pub fn add(&mut self, key: &str) {
        for idx in self.probe_indexes(key) {
            self.bits[idx] = true;
        }
    }

    /// Returns `true` if the key **might** have been added, `false` if it
    /// **definitely** was not.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.probe_indexes(key).into_iter().all(|idx| self.bits[idx])
    }

    /// Returns the number of bits in the filter.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the number of set bits (diagnostics only).
    #[must_use]
    pub fn popcount(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    fn probe_indexes(&self, key: &str) -> [usize; 3] {
        let h1 = fnv1a_32(key.as_bytes(), &[]);
        let h2 = fnv1a_32(key.as_bytes(), b"salt");
        let h3 = fnv1a_32(b"prefix", key.as_bytes());
        [
            h1 as usize % self.size,
            h2 as usize % self.size,
            h3 as usize % self.size,
        ]
    }
}

/// Renders the filter as `'0'`/`'1'` characters, length = `size`.
///
/// This is the representation embedded in the SSTable header.
impl fmt::Display for BloomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in &self.bits {
            f.write_str(if *bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for BloomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BloomFilter")
            .field("size", &self.size)
            .field("set_bits", &self.popcount())
            .finish()
    }
}

impl FromStr for BloomFilter {
    type Err = ParseBloomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bit_string(s)
    }
}

/// Errors produced when parsing a filter from its textual rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseBloomError {
    /// The input string was empty (a filter must have at least one bit).
    Empty,
    /// A character other than `'0'` or `'1'` was encountered.
    BadChar { pos: usize, ch: char },
}

impl fmt::Display for ParseBloomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseBloomError::Empty => write!(f, "empty bloom filter string"),
            ParseBloomError::BadChar { pos, ch } => {
                write!(f, "invalid bloom filter character {:?} at position {}", ch, pos)
            }
        }
    }
}

impl std::error::Error for ParseBloomError {}

/// FNV-1a 32-bit hash over `prefix` followed by `data`.
///
/// Hashing both slices in one pass avoids allocating the salted input.
fn fnv1a_32(prefix: &[u8], data: &[u8]) -> u32 {
    const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
    const FNV_PRIME: u32 = 0x0100_0193;
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in prefix.iter().chain(data) {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}
