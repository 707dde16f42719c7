//! Random sources feeding backoff jitter.
//!
//! The jitter draw is the only randomness in a retry loop, so it sits behind a small
//! trait that can be swapped for a seeded generator in tests.
//!
//! Notes:
//! - `ThreadRandom` uses `rand`'s thread-local RNG; concurrent calls never share state.
//! - `SeededRandom` serializes access to one `StdRng` behind a mutex so that a single
//!   seed produces one reproducible sequence, even when the client is shared.
//!
//! Example:
//! ```rust
//! use failaware::{RandomSource, SeededRandom};
//!
//! let a = SeededRandom::new(666);
//! let b = SeededRandom::new(666);
//! assert_eq!(a.random_offset(-10, 10), b.random_offset(-10, 10));
//! ```

use rand::rngs::StdRng;
use rand::{rng, Rng, SeedableRng};
use std::fmt;
use std::sync::Mutex;

/// Source of uniformly distributed offsets used for jitter.
pub trait RandomSource: Send + Sync + fmt::Debug {
    /// Draw from the half-open range `[low, high)`. Returns `low` when the range is empty.
    fn random_offset(&self, low: i64, high: i64) -> i64;
}

/// Default source backed by `rand::rng()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn random_offset(&self, low: i64, high: i64) -> i64 {
        if high <= low {
            return low;
        }
        rng().random_range(low..high)
    }
}

/// Deterministic source for reproducible delays.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }
}

impl RandomSource for SeededRandom {
    fn random_offset(&self, low: i64, high: i64) -> i64 {
        if high <= low {
            return low;
        }
        // A poisoned lock still holds a usable generator.
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.random_range(low..high)
    }
}
