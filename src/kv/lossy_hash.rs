use crate::kv::entry::{hash_tag, log_tag};

/// Entries per bucket, matching `original_source/formica/index.h`'s
/// `NUM_ENTRIES` constant (the spec's "14 or 25" is resolved to 14, the
/// value the original actually compiles with).
const ENTRIES_PER_BUCKET: usize = 14;

#[derive(Clone, Copy)]
struct BucketEntry {
    tag: u32,
    offset: i64,
}

impl BucketEntry {
    const EMPTY: BucketEntry = BucketEntry { tag: 0, offset: -1 };

    #[inline]
    fn is_empty(&self) -> bool {
        self.offset < 0
    }
}

struct Bucket {
    entries: [BucketEntry; ENTRIES_PER_BUCKET],
}

impl Bucket {
    fn empty() -> Self {
        Bucket {
            entries: [BucketEntry::EMPTY; ENTRIES_PER_BUCKET],
        }
    }
}

/// A fixed-size, lossy hash index: `num_buckets` buckets of
/// `ENTRIES_PER_BUCKET` tagged log offsets each. Never grows; inserting past
/// a bucket's capacity silently evicts an existing entry rather than
/// chaining or resizing (spec.md §6).
pub struct LossyHash {
    buckets: Vec<Bucket>,
    num_buckets: usize,
}

impl LossyHash {
    pub fn new(num_buckets: usize) -> Self {
        assert!(num_buckets > 0, "LossyHash needs at least one bucket");
        let buckets = (0..num_buckets).map(|_| Bucket::empty()).collect();
        Self {
            buckets,
            num_buckets,
        }
    }

    pub fn num_buckets(&self) -> usize {
        self.num_buckets
    }

    #[inline]
    fn bucket_index(&self, hash: u64) -> usize {
        hash_tag(hash) as usize % self.num_buckets
    }

    /// Returns the log offset stored for `hash`'s tag in its bucket, if any.
    /// A `None` here is a genuine index miss; a `Some` offset still needs
    /// confirming against the log record itself, since a tag match across
    /// different keys is possible (spec.md §6, §7).
    pub fn lookup(&self, hash: u64) -> Option<i64> {
        let tag = log_tag(hash);
        let bucket = &self.buckets[self.bucket_index(hash)];
        bucket
            .entries
            .iter()
            .find(|e| !e.is_empty() && e.tag == tag)
            .map(|e| e.offset)
    }

    /// Places `offset` under `hash`'s tag in its bucket following three
    /// rules in order: fill an empty slot; overwrite a slot already holding
    /// the same tag; otherwise evict a slot chosen deterministically from
    /// the hash bits. The third rule is a fixed, hash-derived choice, not an
    /// LRU/recency policy, even though the original source's comment there
    /// reads as if it were tail-biased.
    pub fn insert(&mut self, hash: u64, offset: i64) {
        let tag = log_tag(hash);
        let idx = self.bucket_index(hash);
        let bucket = &mut self.buckets[idx];

        if let Some(slot) = bucket.entries.iter_mut().find(|e| e.is_empty()) {
            *slot = BucketEntry { tag, offset };
            return;
        }
        if let Some(slot) = bucket.entries.iter_mut().find(|e| e.tag == tag) {
            slot.offset = offset;
            return;
        }
        let victim = ((hash & 0xF0F0_F0F0) as usize) % ENTRIES_PER_BUCKET;
        bucket.entries[victim] = BucketEntry { tag, offset };
        log::debug!("lossy hash bucket {idx} evicted slot {victim} for tag {tag:#x}");
    }
}
