//! A MICA-style, mmap-backed lossy key/value store with three interchangeable
//! index strategies in front of a shared record framing.

mod chained_store;
mod circular_log;
mod entry;
mod exact_map;
mod lossy_hash;
mod lossy_store;
mod result;

pub use chained_store::{ChainedLossyStore, MAX_CHAIN_LENGTH};
pub use circular_log::{CircularLog, ReadOutcome};
pub use entry::{hash_key, hash_tag, log_tag, Entry};
pub use exact_map::ExactMapStore;
pub use lossy_hash::LossyHash;
pub use lossy_store::LossyHashStore;
pub use result::LookupResult;
