use crate::config::{Config, DEFAULT_BLOOM_FILTER_BITS, DEFAULT_MEMTABLE_THRESHOLD};

#[test]
fn explicit_output_dir_is_used() {
    let config = Config::builder().output_dir("/tmp/cobalt-test").build().unwrap();
    assert_eq!(config.output_dir, std::path::PathBuf::from("/tmp/cobalt-test"));
}

#[test]
fn defaults_are_applied() {
    let config = Config::builder().output_dir("/tmp/cobalt-test").build().unwrap();
    assert_eq!(config.memtable_threshold, DEFAULT_MEMTABLE_THRESHOLD);
    assert_eq!(config.bloom_filter_bits, DEFAULT_BLOOM_FILTER_BITS);
}

#[test]
fn overrides_are_honoured() {
    let config = Config::builder()
        .output_dir("/tmp/cobalt-test")
        .memtable_threshold(3)
        .bloom_filter_bits(256)
        .build()
        .unwrap();
    assert_eq!(config.memtable_threshold, 3);
    assert_eq!(config.bloom_filter_bits, 256);
}

#[test]
fn zero_threshold_is_rejected() {
    let result = Config::builder()
        .output_dir("/tmp/cobalt-test")
        .memtable_threshold(0)
        .build();
    assert!(result.is_err());
}

#[test]
fn zero_bloom_bits_is_rejected() {
    let result = Config::builder()
        .output_dir("/tmp/cobalt-test")
        .bloom_filter_bits(0)
        .build();
    assert!(result.is_err());
}
