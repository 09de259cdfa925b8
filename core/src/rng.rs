//! Deterministic random number generation for synthetic datasets.
//!
//! RULE: the generator never calls a platform RNG.
//! Each customer gets its own stream, seeded from
//! (master_seed XOR customer_index * golden ratio constant). So:
//!   - Adding customers never changes earlier customers' histories.
//!   - Each customer's history is reproducible in isolation.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub struct GeneratorRng {
    inner: Pcg64Mcg,
}

impl GeneratorRng {
    /// Stream for one customer. The index must stay stable for a dataset
    /// to be reproducible.
    pub fn new(master_seed: u64, customer_index: u64) -> Self {
        let derived_seed = master_seed ^ (customer_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Roll an integer in [lo, hi], both ends included.
    pub fn int_in(&mut self, lo: i64, hi: i64) -> i64 {
        assert!(lo <= hi, "empty range {lo}..={hi}");
        let span = (hi - lo) as u64 + 1;
        lo + self.next_u64_below(span) as i64
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}
