use tempfile::tempdir;

use super::helpers::test_engine;

#[test]
fn missing_key_reports_not_found() {
    let dir = tempdir().unwrap();
    let engine = test_engine(dir.path(), 100);

    let err = engine.read("never_written").unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn memtable_shadows_sstable() {
    let dir = tempdir().unwrap();
    let mut engine = test_engine(dir.path(), 2);

    // Flush k=old into an SSTable.
    engine.write("k", b"old").unwrap();
    engine.write("pad", b"x").unwrap();
    assert_eq!(engine.memtable_size(), 0);

    // Buffer k=new in the memtable; it must win over the SSTable copy.
    engine.write("k", b"new").unwrap();
    assert_eq!(engine.read("k").unwrap(), b"new");
}

#[test]
fn newest_sstable_wins_for_stale_copies() {
    let dir = tempdir().unwrap();
    let mut engine = test_engine(dir.path(), 1);

    // Threshold 1: each write flushes immediately, so both tables hold "k".
    engine.write("k", b"v1").unwrap();
    engine.write("k", b"v2").unwrap();
    assert_eq!(engine.sstable_count(), 2);

    assert_eq!(engine.read("k").unwrap(), b"v2");
}

#[test]
fn read_returns_exact_bytes_across_flush_boundary() {
    let dir = tempdir().unwrap();
    let mut engine = test_engine(dir.path(), 3);

    let values: Vec<Vec<u8>> = vec![
        b"".to_vec(),
        vec![0u8, 1, 2, 255],
        vec![b'x'; 1024],
        b"plain".to_vec(),
    ];

    for (i, value) in values.iter().enumerate() {
        engine.write(&format!("key{}", i), value).unwrap();
    }

    for (i, value) in values.iter().enumerate() {
        assert_eq!(&engine.read(&format!("key{}", i)).unwrap(), value);
    }
}

#[test]
fn read_after_flush_goes_through_sstable() {
    let dir = tempdir().unwrap();
    let mut engine = test_engine(dir.path(), 3);

    engine.write("a", b"data").unwrap();
    engine.write("b", b"data").unwrap();
    engine.write("c", b"data").unwrap();

    // Memtable is empty; the only copy lives in the SSTable.
    assert_eq!(engine.memtable_size(), 0);
    assert_eq!(engine.read("a").unwrap(), b"data");
    assert_eq!(engine.read("b").unwrap(), b"data");
    assert_eq!(engine.read("c").unwrap(), b"data");
}

#[test]
fn bloom_rejects_spare_the_disk_but_not_correctness() {
    let dir = tempdir().unwrap();
    let mut engine = test_engine(dir.path(), 1);

    for i in 0..10 {
        engine.write(&format!("member{}", i), b"v").unwrap();
    }

    // Probing absent keys must fail cleanly regardless of how many tables
    // the bloom filters reject outright.
    for i in 0..10 {
        assert!(engine.read(&format!("outsider{}", i)).is_err());
    }
}
