use twox_hash::XxHash64;
use std::hash::Hasher;

/// Seed used for every key hash in this crate. Fixed rather than random so
/// that two runs over the same keys produce the same `log_tag`/`hash_tag`
/// split, which the test suite and `debug_dump` rely on for reproducibility.
const HASH_SEED: u64 = 0x9E3779B97F4A7C15;

/// A key/value pair together with its 64-bit hash, computed once at
/// construction and threaded through every store so `log_tag`/`hash_tag`
/// never need to be recomputed from the raw key.
pub struct Entry {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
    pub hash: u64,
}

impl Entry {
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        let key = key.into();
        let value = value.into();
        let hash = hash_key(&key);
        Self { key, value, hash }
    }
}

/// Hashes a raw key the same way every store in this crate expects.
pub fn hash_key(key: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(HASH_SEED);
    hasher.write(key);
    hasher.finish()
}

/// Low 32 bits of the hash: the per-record tag stored both in a circular
/// log record's header (to detect a slot since overwritten by a different
/// key, spec.md §5, §7) and in a `LossyHash`/`ChainedLossyStore` bucket
/// entry (to disambiguate entries sharing a bucket without storing the full
/// key, spec.md §6).
#[inline]
pub fn log_tag(hash: u64) -> u32 {
    hash as u32
}

/// High 32 bits of the hash: selects which bucket a key falls into in the
/// bucketed stores (`LossyHash`, `ChainedLossyStore`), and is also the sole
/// index key `ExactMapStore` keeps, since that store has no buckets at all
/// (spec.md §6).
#[inline]
pub fn hash_tag(hash: u64) -> u32 {
    (hash >> 32) as u32
}
