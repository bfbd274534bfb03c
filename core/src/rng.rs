//! Deterministic random number generation for synthetic purchase data.
//!
//! RULE: synthetic generation never touches a platform RNG. Every draw
//! comes from a `SeededRng` built from the caller's seed and a stable
//! stream index, so the same seed always yields the same records.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// Stable stream assignments. Append only; reordering changes every stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum Stream {
    Customers = 0,
    Purchases = 1,
}

pub struct SeededRng {
    inner: Pcg64Mcg,
}

impl SeededRng {
    pub fn new(seed: u64, stream: Stream) -> Self {
        let derived_seed = seed ^ (stream as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self {
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n). `n` must be > 0.
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        debug_assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n.max(1)
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick one element uniformly.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.next_u64_below(items.len() as u64) as usize]
    }

    /// Sample from a simplified Pareto distribution.
    /// x_min: minimum value, alpha: shape parameter (higher = less skewed).
    pub fn pareto(&mut self, x_min: f64, alpha: f64) -> f64 {
        let u = self.next_f64().max(1e-10);
        x_min * u.powf(-1.0 / alpha)
    }
}
