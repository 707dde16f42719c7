//! Exponential backoff with symmetric jitter.
//!
//! Attempt semantics: `attempt` is the zero-based index of the attempt that just failed,
//! so the wait before the second attempt uses `attempt = 0`.
//!
//! Formula, in whole milliseconds:
//! - `base = 2^attempt * factor`
//! - `max_jitter = base / 3`
//! - `delay = base + uniform[-max_jitter, max_jitter)`, floored at 1 ms
//!
//! Example
//! ```rust
//! use std::time::Duration;
//! use failaware::{BackoffCalculator, SeededRandom};
//!
//! let backoff = BackoffCalculator::new(Duration::from_millis(30));
//! let delay = backoff.delay(1, &SeededRandom::new(1));
//! assert!(delay >= Duration::from_millis(40) && delay < Duration::from_millis(80));
//! ```
//!
//! Overflow behavior: computations that would overflow saturate to `MAX_BACKOFF` (1 day).

use crate::jitter::RandomSource;
use std::time::Duration;

/// Maximum delay used when calculations overflow (1 day).
pub const MAX_BACKOFF: Duration = Duration::from_secs(24 * 60 * 60);

/// Smallest wait ever returned.
pub const MIN_BACKOFF: Duration = Duration::from_millis(1);

/// Computes jittered exponential waits from a base delay factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffCalculator {
    factor: Duration,
}

impl BackoffCalculator {
    pub fn new(factor: Duration) -> Self {
        Self { factor }
    }

    pub fn factor(&self) -> Duration {
        self.factor
    }

    /// Un-jittered exponential delay in milliseconds for `attempt`.
    pub fn base_millis(&self, attempt: usize) -> u64 {
        let max_millis = MAX_BACKOFF.as_millis() as u64;
        let factor_millis = u64::try_from(self.factor.as_millis()).unwrap_or(u64::MAX);
        let exponent = attempt.min(u32::MAX as usize) as u32;
        let multiplier = 2u64.checked_pow(exponent).unwrap_or(u64::MAX);
        factor_millis.saturating_mul(multiplier).min(max_millis)
    }

    /// Jittered delay for `attempt`, drawing from `random`.
    pub fn delay(&self, attempt: usize, random: &dyn RandomSource) -> Duration {
        let base = self.base_millis(attempt) as i64;
        let max_jitter = base / 3;
        let offset =
            if max_jitter == 0 { 0 } else { random.random_offset(-max_jitter, max_jitter) };
        let millis = base + offset;
        if millis <= 0 {
            return MIN_BACKOFF;
        }
        Duration::from_millis(millis as u64)
    }

    /// Inclusive bounds `(min, max)` a jittered delay for `attempt` can take.
    pub fn bounds(&self, attempt: usize) -> (Duration, Duration) {
        let base = self.base_millis(attempt);
        let max_jitter = base / 3;
        let low = Duration::from_millis(base - max_jitter).max(MIN_BACKOFF);
        let high = Duration::from_millis(base + max_jitter).max(MIN_BACKOFF);
        (low, high)
    }
}
