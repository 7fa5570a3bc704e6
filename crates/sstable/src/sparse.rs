//! Key -> byte-offset map for one SSTable.
//!
//! Every key in the table has an entry pointing at the byte where its record
//! begins, relative to the start of the data block. The structure is named
//! "sparse" to leave room for prefix-only indexing later; today it is dense.
//!
//! The on-disk rendering is `key1:off1,key2:off2,...` in ascending key
//! order, which keeps table serialization deterministic. Lookups always go
//! through the map, never the string.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};

/// Associative key -> offset structure backing SSTable point reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparseIndex {
    entries: BTreeMap<String, i64>,
}

impl SparseIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the offset for `key`.
    ///
    /// Keys containing `','` or `':'` are rejected -- both characters are
    /// reserved by the textual encoding.
    pub fn update(&mut self, key: &str, offset: i64) -> Result<()> {
        if key.contains([',', ':']) {
            bail!("sparse index key may not contain ',' or ':': {:?}", key);
        }
        self.entries.insert(key.to_string(), offset);
        Ok(())
    }

    /// Returns the data-block offset for `key`, if indexed.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<i64> {
        self.entries.get(key).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Indexed keys in ascending order -- the table's natural key order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Byte length of the textual rendering, computed without building it.
    ///
    /// Used by [`crate::codec::metadata_size`] to derive seek offsets.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        if self.entries.is_empty() {
            return 0;
        }
        let body: usize = self
            .entries
            .iter()
            .map(|(key, offset)| key.len() + 1 + decimal_width(*offset))
            .sum();
        body + self.entries.len() - 1 // comma separators
    }
}

/// Renders `key:offset` pairs joined by commas, ascending key order.
impl fmt::Display for SparseIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, offset)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}:{}", key, offset)?;
        }
        Ok(())
    }
}

/// Parses the textual rendering back into a map. The empty string is the
/// empty index.
impl FromStr for SparseIndex {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut index = SparseIndex::new();
        if s.is_empty() {
            return Ok(index);
        }
        for entry in s.split(',') {
            let Some((key, offset)) = entry.split_once(':') else {
                bail!("malformed sparse index entry: {:?}", entry);
            };
            let offset: i64 = offset
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid sparse index offset: {:?}", entry))?;
            index.update(key, offset)?;
        }
        Ok(index)
    }
}

/// Number of characters `offset` occupies in decimal, sign included.
fn decimal_width(offset: i64) -> usize {
    if offset == 0 {
        return 1;
    }
    let sign = usize::from(offset < 0);
    let mut magnitude = offset.unsigned_abs();
    let mut digits = 0;
    while magnitude > 0 {
        digits += 1;
        magnitude /= 10;
    }
    sign + digits
}
