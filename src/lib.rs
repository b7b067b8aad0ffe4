//! Two fixed-capacity in-memory indexing structures: a B+-tree over integer
//! keys (`btree`), and a MICA-style lossy key/value store built from a
//! circular log and a choice of three index strategies (`kv`).
//!
//! Neither structure supports concurrent mutation, durability, or crash
//! recovery; both trade some correctness (bounded fan-out, lossy hashing)
//! for predictable, allocation-light memory use.

pub mod btree;
pub mod error;
pub mod fixed_vector;
pub mod kv;

pub use btree::Tree;
pub use kv::{
    ChainedLossyStore, CircularLog, Entry, ExactMapStore, LookupResult, LossyHash, LossyHashStore,
    ReadOutcome, MAX_CHAIN_LENGTH,
};
