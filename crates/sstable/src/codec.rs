//! Binary codec for SSTable records and whole-file images.
//!
//! Every size is written explicitly before its field, little-endian,
//! redundantly with the field lengths -- the layout favours simple,
//! seekable decoding over compactness. [`record_size`] and
//! [`metadata_size`] mirror the encoder arithmetically so the manager and
//! table reader can compute seek offsets without serializing anything.

use std::io::{self, Read, Write};

use anyhow::{bail, Context, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use bloom::BloomFilter;

use crate::sparse::SparseIndex;

/// Width of the `key_size` field.
pub const KEY_SIZE_BYTES: usize = 4;
/// Width of the `value_size` field.
pub const VALUE_SIZE_BYTES: usize = 4;
/// Width of the `timestamp_size` field.
pub const TIMESTAMP_SIZE_BYTES: usize = 8;
/// Width of the timestamp itself.
pub const TIMESTAMP_BYTES: usize = 8;
/// Width of the `tombstone_size` field.
pub const TOMBSTONE_SIZE_BYTES: usize = 4;
/// Width of the tombstone flag itself.
pub const TOMBSTONE_BYTES: usize = 1;
/// Width of the `bloom_size` header field.
pub const BLOOM_SIZE_BYTES: usize = 4;
/// Width of the `sparse_size` header field.
pub const SPARSE_SIZE_BYTES: usize = 4;

/// Decode-time allocation cap for keys (corrupt-input guard).
const MAX_KEY_BYTES: usize = 64 * 1024;
/// Decode-time allocation cap for values (the engine caps writes at 1 KiB;
/// the slack tolerates foreign files without risking huge allocations).
const MAX_VALUE_BYTES: usize = 1024 * 1024;
/// Decode-time allocation cap for either header section.
const MAX_HEADER_BYTES: usize = 16 * 1024 * 1024;

/// The atomic persisted unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub key: String,
    pub value: Vec<u8>,
    /// Seconds since the unix epoch, stamped at memtable insertion.
    pub timestamp: i64,
    /// Reserved for deletion; never set by the current write path and
    /// ignored on reads.
    pub tombstone: bool,
}

/// A fully decoded SSTable file: header structures plus every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableData {
    pub bloom: BloomFilter,
    pub sparse: SparseIndex,
    pub records: Vec<Record>,
}

/// Encoded size of one record, as a pure function of its variable parts.
#[must_use]
pub fn record_size(key: &str, value: &[u8]) -> usize {
    KEY_SIZE_BYTES
        + key.len()
        + VALUE_SIZE_BYTES
        + value.len()
        + TIMESTAMP_SIZE_BYTES
        + TIMESTAMP_BYTES
        + TOMBSTONE_SIZE_BYTES
        + TOMBSTONE_BYTES
}

/// Encoded size of the file header (bloom bits + sparse index, each with a
/// size prefix). Offsets in the sparse index are relative to the byte
/// immediately after this header.
#[must_use]
pub fn metadata_size(bloom: &BloomFilter, sparse: &SparseIndex) -> usize {
    BLOOM_SIZE_BYTES + bloom.size() + SPARSE_SIZE_BYTES + sparse.encoded_len()
}

/// Writes one record to `w` in the fixed layout.
pub fn write_record<W: Write>(w: &mut W, record: &Record) -> io::Result<()> {
    w.write_i32::<LittleEndian>(record.key.len() as i32)?;
    w.write_all(record.key.as_bytes())?;
    w.write_i32::<LittleEndian>(record.value.len() as i32)?;
    w.write_all(&record.value)?;
    w.write_i64::<LittleEndian>(TIMESTAMP_BYTES as i64)?;
    w.write_i64::<LittleEndian>(record.timestamp)?;
    w.write_i32::<LittleEndian>(TOMBSTONE_BYTES as i32)?;
    w.write_u8(u8::from(record.tombstone))?;
    Ok(())
}

/// Writes the header (bloom bits then sparse index, each length-prefixed).
pub fn write_metadata<W: Write>(
    w: &mut W,
    bloom: &BloomFilter,
    sparse: &SparseIndex,
) -> io::Result<()> {
    let bloom_text = bloom.to_string();
    w.write_i32::<LittleEndian>(bloom_text.len() as i32)?;
    w.write_all(bloom_text.as_bytes())?;

    let sparse_text = sparse.to_string();
    w.write_i32::<LittleEndian>(sparse_text.len() as i32)?;
    w.write_all(sparse_text.as_bytes())?;
    Ok(())
}

/// Produces the complete byte image of an SSTable file.
pub fn encode_table(
    bloom: &BloomFilter,
    sparse: &SparseIndex,
    records: &[Record],
) -> Result<Vec<u8>> {
    let data_len: usize = records
        .iter()
        .map(|r| record_size(&r.key, &r.value))
        .sum();
    let mut buf = Vec::with_capacity(metadata_size(bloom, sparse) + data_len);

    write_metadata(&mut buf, bloom, sparse)?;
    for record in records {
        write_record(&mut buf, record)?;
    }
    Ok(buf)
}

/// Decodes exactly one record from `r`.
pub fn read_record<R: Read>(r: &mut R) -> Result<Record> {
    let key_size = r.read_i32::<LittleEndian>()?;
    read_record_body(r, key_size)
}

/// Decodes a record whose `key_size` field has already been consumed.
fn read_record_body<R: Read>(r: &mut R, key_size: i32) -> Result<Record> {
    if key_size < 0 {
        bail!("invalid key size: {}", key_size);
    }
    if key_size as usize > MAX_KEY_BYTES {
        bail!("key size {} exceeds maximum {}", key_size, MAX_KEY_BYTES);
    }
    let mut key = vec![0u8; key_size as usize];
    r.read_exact(&mut key)?;
    let key = String::from_utf8(key).context("record key is not valid utf-8")?;

    let value_size = r.read_i32::<LittleEndian>()?;
    if value_size < 0 {
        bail!("invalid value size: {}", value_size);
    }
    if value_size as usize > MAX_VALUE_BYTES {
        bail!(
            "value size {} exceeds maximum {}",
            value_size,
            MAX_VALUE_BYTES
        );
    }
    let mut value = vec![0u8; value_size as usize];
    r.read_exact(&mut value)?;

    let timestamp_size = r.read_i64::<LittleEndian>()?;
    if timestamp_size < 0 {
        bail!("invalid timestamp size: {}", timestamp_size);
    }
    let timestamp = r.read_i64::<LittleEndian>()?;

    let tombstone_size = r.read_i32::<LittleEndian>()?;
    if tombstone_size < 0 {
        bail!("invalid tombstone size: {}", tombstone_size);
    }
    let tombstone = r.read_u8()? != 0;

    Ok(Record {
        key,
        value,
        timestamp,
        tombstone,
    })
}

/// Decodes the header, yielding the bloom filter and sparse index.
///
/// Leaves `r` positioned at the first data-block record.
pub fn read_metadata<R: Read>(r: &mut R) -> Result<(BloomFilter, SparseIndex)> {
    let bloom_size = r.read_i32::<LittleEndian>()?;
    if bloom_size <= 0 {
        bail!("invalid bloom filter size: {}", bloom_size);
    }
    if bloom_size as usize > MAX_HEADER_BYTES {
        bail!("bloom filter size {} exceeds maximum", bloom_size);
    }
    let mut bloom_text = vec![0u8; bloom_size as usize];
    r.read_exact(&mut bloom_text)?;
    let bloom_text =
        String::from_utf8(bloom_text).context("bloom filter bits are not valid utf-8")?;
    let bloom = BloomFilter::from_bit_string(&bloom_text)
        .context("failed to parse bloom filter bits")?;

    let sparse_size = r.read_i32::<LittleEndian>()?;
    if sparse_size < 0 {
        bail!("invalid sparse index size: {}", sparse_size);
    }
    if sparse_size as usize > MAX_HEADER_BYTES {
        bail!("sparse index size {} exceeds maximum", sparse_size);
    }
    let mut sparse_text = vec![0u8; sparse_size as usize];
    r.read_exact(&mut sparse_text)?;
    let sparse_text =
        String::from_utf8(sparse_text).context("sparse index is not valid utf-8")?;
    let sparse: SparseIndex = sparse_text.parse()?;

    Ok((bloom, sparse))
}

/// Decodes an entire file: header, then records until EOF.
pub fn read_table<R: Read>(r: &mut R) -> Result<TableData> {
    let (bloom, sparse) = read_metadata(r)?;

    let mut records = Vec::new();
    loop {
        let key_size = match r.read_i32::<LittleEndian>() {
            Ok(v) => v,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        };
        records.push(read_record_body(r, key_size)?);
    }

    Ok(TableData {
        bloom,
        sparse,
        records,
    })
}
