//! Shared helpers for the integration tests. Not every test file uses every
//! helper, so some functions may show up unused depending on which `tests/*`
//! binary is compiled; that's expected for a `tests/` support module.
#![allow(dead_code)]

/// A small, deterministic PRNG so dataset generation doesn't depend on the
/// `rand` crate. Same multiplier/increment/seed as a standard 64-bit LCG;
/// good enough for shuffling test fixtures, not for anything cryptographic.
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1);
        self.state
    }

    pub fn next_range(&mut self, bound: usize) -> usize {
        (self.next_u64() % bound as u64) as usize
    }

    /// Fisher-Yates shuffle of `0..n` using this generator.
    pub fn shuffled_range(&mut self, n: usize) -> Vec<i32> {
        let mut v: Vec<i32> = (0..n as i32).collect();
        for i in (1..v.len()).rev() {
            let j = self.next_range(i + 1);
            v.swap(i, j);
        }
        v
    }
}

pub const SEED: u64 = 0x9E3779B97F4A7C15;

/// Turns on `log` output for a test run when `RUST_LOG` is set; safe to call
/// from every test since a second `try_init` after the first just no-ops.
pub fn init_logging() {
    let _ = env_logger::try_init();
}
