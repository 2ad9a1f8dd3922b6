//! Deterministic random number generation for puzzle generation.
//!
//! ## Key Features
//!
//! - **Deterministic**: Same seed produces identical sequence
//! - **Tiny state**: a single 32-bit word, so it is trivially serializable
//! - **Portable**: Matches the mulberry32 mixer bit for bit, so seeds
//!   reproduce across implementations
//!
//! ```
//! use puzzle_forge::core::GameRng;
//!
//! let mut a = GameRng::new(7);
//! let mut b = GameRng::new(7);
//! assert_eq!(a.int(100), b.int(100));
//! assert!(a.next_f64() < 1.0);
//! ```

use serde::{Deserialize, Serialize};

const GOLDEN_GAMMA: u32 = 0x6D2B_79F5;

/// Deterministic 32-bit mixing generator (mulberry32).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRng {
    state: u32,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Raw 32-bit output.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(GOLDEN_GAMMA);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Uniform float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }

    /// Uniform integer in `[0, max)`; `0` when `max` is zero.
    pub fn int(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        let value = (self.next_f64() * max as f64).floor() as usize;
        value.min(max - 1)
    }

    /// Choose a random element from a slice.
    #[must_use]
    pub fn pick<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        if slice.is_empty() {
            return None;
        }
        let index = self.int(slice.len());
        slice.get(index)
    }

    /// Current internal word, for checkpointing.
    #[must_use]
    pub const fn state(&self) -> u32 {
        self.state
    }
}
