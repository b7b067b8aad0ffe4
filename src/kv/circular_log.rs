use memmap2::MmapMut;

use crate::error::CircularLogError;

/// Marks the start of a live record; anything else at a header position
/// means the slot was never written (or the log was only partially mapped).
const SENTINEL: u8 = 0x21; // b'!'

/// `sentinel(1) + size(4) + keylen(4) + valuelen(4) + log_tag(4)`.
const HEADER_SIZE: usize = 1 + 4 + 4 + 4 + 4;

/// Outcome of reading a record back out of the log at a caller-supplied
/// offset. Distinguishing `TagMismatch` from `Hit` is what lets the stores
/// built on top of `CircularLog` report an `OtherKey` miss reason instead of
/// treating every non-hit as a plain miss (spec.md §5, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    Hit,
    TagMismatch,
    InvalidSentinel,
}

/// A fixed-size, mmap-backed ring buffer of framed key/value records.
///
/// Grounded on `memmap2::MmapMut::map_anon` as used for in-memory
/// memmapped storage in the retrieval pack's `JojiiOfficial-Bytestore`
/// manifest; the framing format (sentinel byte, then fixed-width header
/// fields, then raw key/value bytes) follows `original_source/formica/
/// circular-log.h`.
pub struct CircularLog {
    mmap: MmapMut,
    capacity: usize,
    tail: usize,
}

impl CircularLog {
    /// `size` must exceed the header size; otherwise nothing could ever be
    /// written.
    pub fn new(size: usize) -> Self {
        assert!(
            size > HEADER_SIZE,
            "circular log size {size} must exceed header size {HEADER_SIZE}"
        );
        let mmap = MmapMut::map_anon(size).expect("anonymous mmap allocation failed");
        Self {
            mmap,
            capacity: size,
            tail: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends a framed record at the tail, wrapping around the end of the
    /// buffer if necessary, and advances the tail past it. Returns the
    /// offset the record was written at.
    pub fn insert(&mut self, key: &[u8], value: &[u8], hash: u64) -> Result<i64, CircularLogError> {
        let required = HEADER_SIZE + key.len() + value.len();
        if required > self.capacity {
            return Err(CircularLogError::OutOfCapacity {
                required,
                capacity: self.capacity,
            });
        }
        let offset = self.tail;
        if offset + required > self.capacity {
            log::debug!(
                "circular log tail wraps: {required} bytes at offset {offset} spill past capacity {}",
                self.capacity
            );
        }
        self.write_record(offset, key, value, hash, required);
        self.tail = (offset + required) % self.capacity;
        log::trace!("circular log appended {required} bytes at offset {offset}");
        Ok(offset as i64)
    }

    /// Attempts to overwrite the record at `offset` in place (when the slot
    /// originally reserved at least `required` bytes); otherwise degrades to
    /// an `insert` at the tail, matching the original `Update` semantics
    /// described in `original_source/formica/circular-log.cc`.
    pub fn update(
        &mut self,
        offset: i64,
        key: &[u8],
        value: &[u8],
        hash: u64,
    ) -> Result<i64, CircularLogError> {
        let required = HEADER_SIZE + key.len() + value.len();
        if required > self.capacity {
            return Err(CircularLogError::OutOfCapacity {
                required,
                capacity: self.capacity,
            });
        }
        let offset = offset as usize % self.capacity;
        if let Some(old_size) = self.existing_record_size(offset) {
            if required <= old_size {
                self.write_record(offset, key, value, hash, old_size);
                log::trace!("circular log updated record in place at offset {offset}");
                return Ok(offset as i64);
            }
        }
        self.insert(key, value, hash)
    }

    /// Reads the record at `offset`, comparing its embedded tag against
    /// `expected_tag` (the caller's `log_tag`). Writes into `key_out`/
    /// `value_out` only on `ReadOutcome::Hit`.
    pub fn read_from(
        &self,
        offset: i64,
        expected_tag: u32,
        key_out: &mut Vec<u8>,
        value_out: &mut Vec<u8>,
    ) -> ReadOutcome {
        let offset = offset as usize % self.capacity;
        let mut pos = offset;

        let sentinel = self.mmap[pos];
        pos = self.advance(pos, 1);
        if sentinel != SENTINEL {
            return ReadOutcome::InvalidSentinel;
        }

        let (_size, next) = self.get_u32(pos);
        pos = next;
        let (keylen, next) = self.get_u32(pos);
        pos = next;
        let (valuelen, next) = self.get_u32(pos);
        pos = next;
        let (tag, next) = self.get_u32(pos);
        pos = next;

        if tag != expected_tag {
            return ReadOutcome::TagMismatch;
        }

        key_out.clear();
        value_out.clear();
        let (key_bytes, next) = self.get_bytes(pos, keylen as usize);
        pos = next;
        let (value_bytes, _next) = self.get_bytes(pos, valuelen as usize);
        key_out.extend_from_slice(&key_bytes);
        value_out.extend_from_slice(&value_bytes);
        ReadOutcome::Hit
    }

    /// Returns the `size` field of the record at `offset` if its sentinel is
    /// intact, else `None`.
    fn existing_record_size(&self, offset: usize) -> Option<usize> {
        if self.mmap[offset] != SENTINEL {
            return None;
        }
        let (size, _) = self.get_u32(self.advance(offset, 1));
        Some(size as usize)
    }

    fn write_record(&mut self, offset: usize, key: &[u8], value: &[u8], hash: u64, size: usize) {
        let tag = crate::kv::entry::log_tag(hash);
        let mut pos = offset;
        self.mmap[pos] = SENTINEL;
        pos = self.advance(pos, 1);
        pos = self.put_u32(pos, size as u32);
        pos = self.put_u32(pos, key.len() as u32);
        pos = self.put_u32(pos, value.len() as u32);
        pos = self.put_u32(pos, tag);
        pos = self.put_bytes(pos, key);
        let _ = self.put_bytes(pos, value);
    }

    #[inline]
    fn advance(&self, offset: usize, n: usize) -> usize {
        (offset + n) % self.capacity
    }

    fn put_u32(&mut self, offset: usize, v: u32) -> usize {
        self.put_bytes(offset, &v.to_le_bytes())
    }

    fn get_u32(&self, offset: usize) -> (u32, usize) {
        let (bytes, next) = self.get_bytes(offset, 4);
        let mut arr = [0u8; 4];
        arr.copy_from_slice(&bytes);
        (u32::from_le_bytes(arr), next)
    }

    /// Writes `data` starting at `offset`, wrapping around the end of the
    /// buffer as needed, and returns the offset just past the write.
    fn put_bytes(&mut self, offset: usize, data: &[u8]) -> usize {
        if data.is_empty() {
            return offset;
        }
        let first_len = (self.capacity - offset).min(data.len());
        self.mmap[offset..offset + first_len].copy_from_slice(&data[..first_len]);
        if first_len < data.len() {
            let rest = &data[first_len..];
            self.mmap[0..rest.len()].copy_from_slice(rest);
        }
        self.advance(offset, data.len())
    }

    /// Reads `len` bytes starting at `offset`, handling wraparound, and
    /// returns them together with the offset just past the read.
    fn get_bytes(&self, offset: usize, len: usize) -> (Vec<u8>, usize) {
        if len == 0 {
            return (Vec::new(), offset);
        }
        let first_len = (self.capacity - offset).min(len);
        let mut out = Vec::with_capacity(len);
        out.extend_from_slice(&self.mmap[offset..offset + first_len]);
        if first_len < len {
            out.extend_from_slice(&self.mmap[0..len - first_len]);
        }
        (out, self.advance(offset, len))
    }

    #[cfg(test)]
    pub(crate) fn debug_dump(&self) -> String {
        format!("capacity={} tail={}", self.capacity, self.tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::entry::{hash_key, log_tag};

    #[test]
    fn insert_then_read_round_trips() {
        let mut log = CircularLog::new(256);
        let hash = hash_key(b"k1");
        let offset = log.insert(b"k1", b"v1", hash).unwrap();

        let mut key_out = Vec::new();
        let mut value_out = Vec::new();
        let outcome = log.read_from(offset, log_tag(hash), &mut key_out, &mut value_out);
        assert_eq!(outcome, ReadOutcome::Hit);
        assert_eq!(key_out, b"k1");
        assert_eq!(value_out, b"v1");
    }

    #[test]
    fn wrap_around_preserves_record_integrity() {
        let mut log = CircularLog::new(70);
        let mut last_offset = 0i64;
        let mut last_hash = 0u64;
        for i in 0..10 {
            let key = format!("key{i}");
            let value = format!("value-{i}-payload");
            let hash = hash_key(key.as_bytes());
            last_offset = log.insert(key.as_bytes(), value.as_bytes(), hash).unwrap();
            last_hash = hash;
        }
        let mut key_out = Vec::new();
        let mut value_out = Vec::new();
        let outcome = log.read_from(last_offset, log_tag(last_hash), &mut key_out, &mut value_out);
        assert_eq!(outcome, ReadOutcome::Hit);
        assert_eq!(key_out, b"key9");
    }

    #[test]
    fn update_in_place_when_it_fits_else_appends() {
        let mut log = CircularLog::new(256);
        let hash = hash_key(b"k");
        let offset1 = log.insert(b"k", b"short", hash).unwrap();
        let offset2 = log.update(offset1, b"k", b"tinier", hash).unwrap();
        assert_eq!(offset1, offset2, "smaller payload should fit in place");

        let offset3 = log
            .update(offset1, b"k", b"a much longer value than before", hash)
            .unwrap();
        assert_ne!(offset1, offset3, "oversized payload should append instead");
    }

    #[test]
    fn tag_mismatch_is_reported_as_such() {
        let mut log = CircularLog::new(256);
        let hash = hash_key(b"k1");
        let offset = log.insert(b"k1", b"v1", hash).unwrap();
        let mut key_out = Vec::new();
        let mut value_out = Vec::new();
        let outcome = log.read_from(offset, log_tag(hash) ^ 0xFFFF_FFFF, &mut key_out, &mut value_out);
        assert_eq!(outcome, ReadOutcome::TagMismatch);
    }
}
