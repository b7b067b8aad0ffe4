use std::cell::Cell;
use std::collections::HashMap;

use crate::error::CircularLogError;
use crate::kv::circular_log::{CircularLog, ReadOutcome};
use crate::kv::entry::{hash_tag, log_tag, Entry};
use crate::kv::result::LookupResult;

/// A store whose index keys on `hash_tag` rather than the full key, exactly
/// as `original_source/formica/index.cc`'s `Index` class does. A HashMap
/// keyed by the complete key would be strictly more precise, but it would
/// also make the `OtherKey` miss reason unreachable: the whole point of
/// tagging by a 32-bit slice of the hash is that two different keys can
/// collide there, and callers need to be able to observe that.
pub struct ExactMapStore {
    index: HashMap<u32, i64>,
    log: CircularLog,
    index_misses: Cell<u64>,
    log_overwritten: Cell<u64>,
    other_key: Cell<u64>,
}

impl ExactMapStore {
    pub fn new(log_size: usize) -> Self {
        Self {
            index: HashMap::new(),
            log: CircularLog::new(log_size),
            index_misses: Cell::new(0),
            log_overwritten: Cell::new(0),
            other_key: Cell::new(0),
        }
    }

    pub fn insert(&mut self, entry: &Entry) -> Result<(), CircularLogError> {
        let offset = self.log.insert(&entry.key, &entry.value, entry.hash)?;
        self.index.insert(hash_tag(entry.hash), offset);
        Ok(())
    }

    pub fn read(&self, key: &[u8], hash: u64, value_out: &mut Vec<u8>) -> LookupResult {
        let tag = hash_tag(hash);
        let offset = match self.index.get(&tag) {
            Some(offset) => *offset,
            None => {
                self.index_misses.set(self.index_misses.get() + 1);
                log::trace!("exact map miss: no index entry for hash_tag {tag:#x}");
                return LookupResult::Miss;
            }
        };

        let mut key_out = Vec::new();
        match self.log.read_from(offset, log_tag(hash), &mut key_out, value_out) {
            ReadOutcome::Hit if key_out == key => LookupResult::Hit,
            ReadOutcome::Hit => {
                self.other_key.set(self.other_key.get() + 1);
                value_out.clear();
                log::trace!("exact map miss: hash_tag {tag:#x} collided with another key");
                LookupResult::OtherKey
            }
            ReadOutcome::TagMismatch | ReadOutcome::InvalidSentinel => {
                self.log_overwritten.set(self.log_overwritten.get() + 1);
                log::trace!("exact map miss: log record at offset {offset} was overwritten");
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
