mod common;

use formica::kv::{hash_key, log_tag};
use formica::{CircularLog, ReadOutcome};

#[test]
fn wrap_around_keeps_reading_the_newest_record_correct() {
    common::init_logging();
    let mut log = CircularLog::new(70);
    let mut last_offset = 0i64;
    let mut last_hash = 0u64;
    let mut last_key = String::new();

    for i in 0..12 {
        let key = format!("k{i}");
        let value = format!("value-payload-{i}");
        let hash = hash_key(key.as_bytes());
        last_offset = log.insert(key.as_bytes(), value.as_bytes(), hash).unwrap();
        last_hash = hash;
        last_key = key;
    }

    let mut key_out = Vec::new();
    let mut value_out = Vec::new();
    let outcome = log.read_from(last_offset, log_tag(last_hash), &mut key_out, &mut value_out);
    assert_eq!(outcome, ReadOutcome::Hit);
    assert_eq!(key_out, last_key.as_bytes());
}

#[test]
fn update_in_place_when_new_payload_fits_else_appends_elsewhere() {
    common::init_logging();
    let mut log = CircularLog::new(256);
    let hash = hash_key(b"counter");
    let first = log.insert(b"counter", b"000000", hash).unwrap();

    let second = log.update(first, b"counter", b"000001", hash).unwrap();
    assert_eq!(first, second, "same-size payload updates in place");

    let mut key_out = Vec::new();
    let mut value_out = Vec::new();
    assert_eq!(
        log.read_from(second, log_tag(hash), &mut key_out, &mut value_out),
        ReadOutcome::Hit
    );
    assert_eq!(value_out, b"000001");

    let third = log
        .update(second, b"counter", b"a value far too long to fit in the original slot", hash)
        .unwrap();
    assert_ne!(second, third, "oversized payload must append instead of corrupting neighbors");
}

#[test]
fn oversized_record_is_rejected_up_front() {
    common::init_logging();
    let mut log = CircularLog::new(32);
    let result = log.insert(b"this key alone", b"is already bigger than the whole log", 0);
    assert!(result.is_err());
}
