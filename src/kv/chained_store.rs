use std::collections::VecDeque;

use crate::kv::entry::{hash_tag, log_tag, Entry};
use crate::kv::result::LookupResult;

/// Longest a single bucket's chain may grow before the oldest entry is
/// evicted, matching `original_source/formica/index.h`'s per-bucket bound.
pub const MAX_CHAIN_LENGTH: usize = 14;

struct ChainEntry {
    tag: u32,
    key: Vec<u8>,
    value: Vec<u8>,
}

/// A lossy store with no backing log: each bucket holds its own bounded,
/// most-recently-used-first chain of full key/value pairs in memory. There
/// is no wraparound-overwrite failure mode here (unlike
/// [`crate::kv::LossyHashStore`]) since nothing is framed into a shared
/// ring buffer; the only way to lose an entry is chain eviction once a
/// bucket exceeds [`MAX_CHAIN_LENGTH`].
pub struct ChainedLossyStore {
    buckets: Vec<VecDeque<ChainEntry>>,
    num_buckets: usize,
}

impl ChainedLossyStore {
    pub fn new(num_buckets: usize) -> Self {
        assert!(num_buckets > 0, "ChainedLossyStore needs at least one bucket");
        let buckets = (0..num_buckets).map(|_| VecDeque::new()).collect();
        Self {
            buckets,
            num_buckets,
        }
    }

    #[inline]
    fn bucket_index(&self, hash: u64) -> usize {
        hash_tag(hash) as usize % self.num_buckets
    }

    /// Inserts at the front of its bucket's chain (most-recently-used);
    /// an existing entry for the same key is replaced rather than
    /// duplicated. Evicts the oldest entry once the chain exceeds
    /// [`MAX_CHAIN_LENGTH`].
    pub fn insert(&mut self, entry: &Entry) {
        let idx = self.bucket_index(entry.hash);
        let tag = log_tag(entry.hash);
        let chain = &mut self.buckets[idx];

        if let Some(pos) = chain.iter().position(|e| e.tag == tag && e.key == entry.key) {
            chain.remove(pos);
        }
        chain.push_front(ChainEntry {
            tag,
            key: entry.key.clone(),
            value: entry.value.clone(),
        });
        if chain.len() > MAX_CHAIN_LENGTH {
            chain.pop_back();
            log::debug!("chained store bucket {idx} evicted oldest entry");
        }
    }

    /// Looks up `key` in its bucket's chain, promoting it to
    /// most-recently-used on a hit.
    pub fn read(&mut self, key: &[u8], hash: u64, value_out: &mut Vec<u8>) -> LookupResult {
        let idx = self.bucket_index(hash);
        let tag = log_tag(hash);
        let chain = &mut self.buckets[idx];

        let tag_pos = match chain.iter().position(|e| e.tag == tag) {
            Some(pos) => pos,
            None => {
                log::trace!("chained store bucket {idx} miss: no entry for tag {tag:#x}");
                return LookupResult::Miss;
            }
        };

        if chain[tag_pos].key != key {
            log::trace!("chained store bucket {idx} miss: tag {tag:#x} belongs to another key");
            return LookupResult::OtherKey;
        }

        let found = chain.remove(tag_pos).expect("position just located");
        value_out.clear();
        value_out.extend_from_slice(&found.value);
        chain.push_front(found);
        LookupResult::Hit
    }
}
