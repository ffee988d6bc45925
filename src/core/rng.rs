//! Deterministic Random Number Generator
//!
//! Linear-congruential generator used for world layout and bot randomness.
//! Given the same seed, produces an identical sequence on all platforms,
//! so a fixed world seed always builds the same arena.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Deterministic PRNG using the classic 32-bit LCG
/// (`state = state * 1664525 + 1013904223 mod 2^32`).
///
/// # Example
///
/// ```
/// use emberclash::core::rng::Lcg;
///
/// let mut rng = Lcg::new(12345);
/// let a = rng.next_u32();
/// let mut again = Lcg::new(12345);
/// assert_eq!(a, again.next_u32()); // Always the same!
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Lcg {
    state: u32,
}

impl Default for Lcg {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Lcg {
    const MULTIPLIER: u32 = 1_664_525;
    const INCREMENT: u32 = 1_013_904_223;

    /// Create a new RNG from a 32-bit seed.
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Derive an RNG from an arbitrary seed string.
    ///
    /// Hashes the string so human-friendly seeds ("tuesday-arena") spread
    /// across the full state space.
    pub fn from_seed_str(seed: &str) -> Self {
        Self::new(derive_seed(seed))
    }

    /// Generate the next 32-bit random value.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        self.state
    }

    /// Generate a random f32 in [0, 1).
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() as f64 / (u32::MAX as f64 + 1.0)) as f32
    }

    /// Generate a random f32 in [min, max).
    #[inline]
    pub fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        if min >= max {
            return min;
        }
        min + self.next_f32() * (max - min)
    }

    /// Generate a random integer in [0, n).
    #[inline]
    pub fn next_below(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        // Simple modulo - slight bias for very large n, acceptable here
        self.next_u32() % n
    }

    /// Random boolean that is true with probability `p` (0.0..=1.0).
    #[inline]
    pub fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }

    /// Select a random element from a slice.
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        if slice.is_empty() {
            None
        } else {
            let idx = self.next_below(slice.len() as u32) as usize;
            Some(&slice[idx])
        }
    }

    /// Get current state (for checkpointing/debugging).
    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Derive a 32-bit seed from a seed string.
pub fn derive_seed(seed: &str) -> u32 {
    let mut hasher = Sha256::new();
    hasher.update(b"EMBERCLASH_SEED_V1");
    hasher.update(seed.as_bytes());
    let hash = hasher.finalize();
    u32::from_le_bytes(hash[0..4].try_into().expect("sha256 output >= 4 bytes"))
}
