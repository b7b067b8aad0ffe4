use std::cell::Cell;

use crate::error::CircularLogError;
use crate::kv::circular_log::{CircularLog, ReadOutcome};
use crate::kv::entry::{log_tag, Entry};
use crate::kv::lossy_hash::LossyHash;
use crate::kv::result::LookupResult;

/// MICA-style store: a bucketed, lossy hash index over a mmap circular log.
/// Two independent sources of loss exist here — the index can evict a
/// bucket slot (spec.md §6), and the log can overwrite an old record once
/// the tail wraps around into it (spec.md §5) — both surface as a
/// `LogOverwritten`/`Miss` result rather than a panic.
pub struct LossyHashStore {
    index: LossyHash,
    log: CircularLog,
    index_misses: Cell<u64>,
    log_overwritten: Cell<u64>,
    other_key: Cell<u64>,
}

impl LossyHashStore {
    pub fn new(log_size: usize, num_buckets: usize) -> Self {
        Self {
            index: LossyHash::new(num_buckets),
            log: CircularLog::new(log_size),
            index_misses: Cell::new(0),
            log_overwritten: Cell::new(0),
            other_key: Cell::new(0),
        }
    }

    pub fn insert(&mut self, entry: &Entry) -> Result<(), CircularLogError> {
        let offset = self.log.insert(&entry.key, &entry.value, entry.hash)?;
        self.index.insert(entry.hash, offset);
        Ok(())
    }

    pub fn read(&self, key: &[u8], hash: u64, value_out: &mut Vec<u8>) -> LookupResult {
        let offset = match self.index.lookup(hash) {
            Some(offset) => offset,
            None => {
                self.index_misses.set(self.index_misses.get() + 1);
                log::trace!("lossy hash store miss: no bucket entry for this hash");
                return LookupResult::Miss;
            }
        };

        let mut key_out = Vec::new();
        match self.log.read_from(offset, log_tag(hash), &mut key_out, value_out) {
            ReadOutcome::Hit if key_out == key => LookupResult::Hit,
            ReadOutcome::Hit => {
                self.other_key.set(self.other_key.get() + 1);
                value_out.clear();
                log::trace!("lossy hash store miss: bucket entry at offset {offset} belongs to another key");
                LookupResult::OtherKey
            }
            ReadOutcome::TagMismatch | ReadOutcome::InvalidSentinel => {
                self.log_overwritten.set(self.log_overwritten.get() + 1);
                log::trace!("lossy hash store miss: log record at offset {offset} was overwritten");
                LookupResult::LogOverwritten
            }
        }
    }

    pub fn index_misses(&self) -> u64 {
        self.index_misses.get()
    }

    pub fn log_overwritten(&self) -> u64 {
        self.log_overwritten.get()
    }

    pub fn other_key(&self) -> u64 {
        self.other_key.get()
    }
}
