use super::*;
use std::fs;
use tempfile::tempdir;

// -------------------- Helpers --------------------

fn replay_all(path: &std::path::Path) -> Result<Vec<(String, Vec<u8>)>, WalError> {
    let mut records = Vec::new();
    replay(path, |key, value| {
        records.push((key.to_string(), value.to_vec()));
    })?;
    Ok(records)
}

// -------------------- Basic append & replay --------------------

#[test]
fn append_and_replay_in_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(WAL_FILE_NAME);

    {
        let mut wal = Wal::open(&path).unwrap();
        wal.append("a", b"1").unwrap();
        wal.append("b", b"2").unwrap();
        wal.append("a", b"3").unwrap();
    }

    let records = replay_all(&path).unwrap();
    assert_eq!(
        records,
        vec![
            ("a".to_string(), b"1".to_vec()),
            ("b".to_string(), b"2".to_vec()),
            ("a".to_string(), b"3".to_vec()),
        ]
    );
}

#[test]
fn record_is_key_colon_value_line() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(WAL_FILE_NAME);

    let mut wal = Wal::open(&path).unwrap();
    wal.append("fruit", b"orange").unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents, "fruit:orange\n");
}

#[test]
fn append_to_existing_log() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(WAL_FILE_NAME);

    {
        let mut wal = Wal::open(&path).unwrap();
        wal.append("first", b"1").unwrap();
    }
    {
        let mut wal = Wal::open(&path).unwrap();
        wal.append("second", b"2").unwrap();
    }

    let records = replay_all(&path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].0, "first");
    assert_eq!(records[1].0, "second");
}

#[test]
fn empty_value_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(WAL_FILE_NAME);

    let mut wal = Wal::open(&path).unwrap();
    wal.append("empty", b"").unwrap();

    let records = replay_all(&path).unwrap();
    assert_eq!(records, vec![("empty".to_string(), Vec::new())]);
}

#[test]
fn value_may_contain_colons() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(WAL_FILE_NAME);

    let mut wal = Wal::open(&path).unwrap();
    wal.append("url", b"http://example.com:8080").unwrap();

    let records = replay_all(&path).unwrap();
    assert_eq!(records[0].1, b"http://example.com:8080".to_vec());
}

// -------------------- Replay edge cases --------------------

#[test]
fn replay_missing_file_is_fresh_start() {
    let dir = tempdir().unwrap();
    let records = replay_all(&dir.path().join("absent.log")).unwrap();
    assert!(records.is_empty());
}

#[test]
fn replay_empty_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(WAL_FILE_NAME);
    fs::write(&path, b"").unwrap();

    let records = replay_all(&path).unwrap();
    assert!(records.is_empty());
}

#[test]
fn truncated_tail_is_ignored() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(WAL_FILE_NAME);

    {
        let mut wal = Wal::open(&path).unwrap();
        wal.append("ok", b"1").unwrap();
    }
    // Simulate a crash mid-append: partial record with no trailing newline.
    let mut data = fs::read(&path).unwrap();
    data.extend_from_slice(b"partial:rec");
    fs::write(&path, &data).unwrap();

    let records = replay_all(&path).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].0, "ok");
}

#[test]
fn line_without_separator_is_malformed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(WAL_FILE_NAME);
    fs::write(&path, b"good:1\nnoseparator\n").unwrap();

    let err = replay_all(&path).unwrap_err();
    assert!(matches!(err, WalError::Malformed { line: 2 }));
}

#[test]
fn non_utf8_key_is_malformed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(WAL_FILE_NAME);
    fs::write(&path, b"\xff\xfe:value\n").unwrap();

    let err = replay_all(&path).unwrap_err();
    assert!(matches!(err, WalError::Malformed { line: 1 }));
}

// -------------------- Truncation --------------------

#[test]
fn truncate_resets_to_zero_bytes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(WAL_FILE_NAME);

    let mut wal = Wal::open(&path).unwrap();
    wal.append("k", b"v").unwrap();
    assert!(fs::metadata(&path).unwrap().len() > 0);

    wal.truncate().unwrap();
    assert_eq!(fs::metadata(&path).unwrap().len(), 0);
}

#[test]
fn appends_after_truncate_start_fresh() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(WAL_FILE_NAME);

    let mut wal = Wal::open(&path).unwrap();
    wal.append("old", b"1").unwrap();
    wal.truncate().unwrap();
    wal.append("new", b"2").unwrap();

    let records = replay_all(&path).unwrap();
    assert_eq!(records, vec![("new".to_string(), b"2".to_vec())]);
}

// -------------------- Volume --------------------

#[test]
fn many_records_replay_in_append_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(WAL_FILE_NAME);

    let n = 5_000usize;
    {
        let mut wal = Wal::open(&path).unwrap();
        for i in 0..n {
            wal.append(&format!("key{}", i), format!("val{}", i).as_bytes())
                .unwrap();
        }
    }

    let records = replay_all(&path).unwrap();
    assert_eq!(records.len(), n);
    for (i, (key, value)) in records.iter().enumerate() {
        assert_eq!(key, &format!("key{}", i));
        assert_eq!(value, format!("val{}", i).as_bytes());
    }
}
