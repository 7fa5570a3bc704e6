use std::time::SystemTime;

use bloom::BloomFilter;
use tempfile::tempdir;

use crate::codec::{encode_table, record_size, Record};
use crate::sparse::SparseIndex;
use crate::table::SsTable;

/// Builds an unpublished table handle plus the encoded file image for the
/// given records, with bloom and sparse index populated the same way the
/// manager's flush walk does.
fn build_table(dir: &std::path::Path, records: &[Record]) -> (SsTable, Vec<u8>) {
    let mut bloom = BloomFilter::new(1000);
    let mut sparse = SparseIndex::new();
    let mut offset = 0i64;
    for record in records {
        bloom.add(&record.key);
        sparse.update(&record.key, offset).unwrap();
        offset += record_size(&record.key, &record.value) as i64;
    }

    let bytes = encode_table(&bloom, &sparse, records).unwrap();
    let table = SsTable {
        level: 0,
        name: "0001".to_string(),
        path: dir.join("level_0").join("0001.bin"),
        bloom,
        sparse,
        created_at: SystemTime::now(),
        seq: 0,
    };
    (table, bytes)
}

fn records_abc() -> Vec<Record> {
    ["a", "b", "c"]
        .iter()
        .enumerate()
        .map(|(i, key)| Record {
            key: key.to_string(),
            value: format!("value_{}", key).into_bytes(),
            timestamp: 1700000000 + i as i64,
            tombstone: false,
        })
        .collect()
}

#[test]
fn write_creates_parent_directory_and_file() {
    let dir = tempdir().unwrap();
    let (table, bytes) = build_table(dir.path(), &records_abc());

    table.write(&bytes).unwrap();

    assert!(table.path.exists());
    assert_eq!(std::fs::read(&table.path).unwrap(), bytes);
}

#[test]
fn write_leaves_no_tmp_file_behind() {
    let dir = tempdir().unwrap();
    let (table, bytes) = build_table(dir.path(), &records_abc());

    table.write(&bytes).unwrap();

    let siblings: Vec<_> = std::fs::read_dir(table.path.parent().unwrap())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(siblings, vec!["0001.bin".to_string()]);
}

#[test]
fn read_record_returns_each_stored_record() {
    let dir = tempdir().unwrap();
    let records = records_abc();
    let (table, bytes) = build_table(dir.path(), &records);
    table.write(&bytes).unwrap();

    for expected in &records {
        let record = table.read_record(&expected.key).unwrap();
        assert_eq!(&record, expected);
    }
}

#[test]
fn read_record_at_nonzero_offset() {
    let dir = tempdir().unwrap();
    let records = records_abc();
    let (table, bytes) = build_table(dir.path(), &records);
    table.write(&bytes).unwrap();

    // "c" is the last record; a correct seek must skip the header and two
    // earlier records.
    let record = table.read_record("c").unwrap();
    assert_eq!(record.value, b"value_c");
}

#[test]
fn read_record_unindexed_key_fails() {
    let dir = tempdir().unwrap();
    let (table, bytes) = build_table(dir.path(), &records_abc());
    table.write(&bytes).unwrap();

    let err = table.read_record("nope").unwrap_err();
    assert!(err.to_string().contains("key not found"));
}

#[test]
fn read_record_missing_file_fails() {
    let dir = tempdir().unwrap();
    let (table, _bytes) = build_table(dir.path(), &records_abc());
    // never written

    assert!(table.read_record("a").is_err());
}

#[test]
fn keys_are_ascending() {
    let dir = tempdir().unwrap();
    let mut records = records_abc();
    records.reverse();
    let (table, _bytes) = build_table(dir.path(), &records);

    let keys: Vec<&str> = table.keys().collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
    assert_eq!(table.len(), 3);
    assert!(!table.is_empty());
}

#[test]
fn empty_value_record_is_readable() {
    let dir = tempdir().unwrap();
    let records = vec![Record {
        key: "empty".to_string(),
        value: Vec::new(),
        timestamp: 1,
        tombstone: false,
    }];
    let (table, bytes) = build_table(dir.path(), &records);
    table.write(&bytes).unwrap();

    let record = table.read_record("empty").unwrap();
    assert!(record.value.is_empty());
}
