//! Pseudo-random numbers for the `rand` operator
//!
//! One `StdRng` per interpreter, seeded from a fixed value or from the
//! operating system.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::bigint::Bigint;

#[derive(Debug, Clone)]
pub struct Rng {
    inner: StdRng,
}

impl Rng {
    pub fn from_seed(seed: u64) -> Self {
        Rng {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Rng {
            inner: StdRng::from_entropy(),
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Uniform draw from `[0, max)`; zero when `max` is not positive
    ///
    /// Draws exactly as many bits as `max` has and rejects candidates that
    /// land at or above it, so there is no modulo bias.
    pub fn randint(&mut self, max: &Bigint) -> Bigint {
        if max.is_zero() || max.is_negative() {
            return Bigint::zero();
        }
        let bits = max.bit_length();
        let words = bits.div_ceil(64) as usize;
        let top_bits = bits % 64;
        loop {
            let mut digits: Vec<u64> = (0..words).map(|_| self.next_u64()).collect();
            if top_bits != 0 {
                if let Some(top) = digits.last_mut() {
                    *top &= (1u64 << top_bits) - 1;
                }
            }
            let candidate = Bigint::from_parts(digits, false);
            if candidate < *max {
                return candidate;
            }
        }
    }
}
