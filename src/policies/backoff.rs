//! # Backoff policy for retrying remote calls.
//!
//! [`BackoffPolicy`] controls how retry delays grow after repeated transient failures.
//! It is parameterized by:
//! - [`BackoffPolicy::first`] the initial delay;
//! - [`BackoffPolicy::factor`] the multiplicative growth factor;
//! - [`BackoffPolicy::max`] the maximum delay cap;
//! - [`BackoffPolicy::jitter`] the randomization applied on top.
//!
//! The delay for attempt `n` is `first × factor^n`, clamped to `max`, then jitter is
//! applied. The base is derived from the attempt number alone, so jitter never feeds
//! back into later delays.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use drainvisor::{BackoffPolicy, ErrorClass, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_secs(1),
//!     max: Duration::from_secs(32),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.next(0), Duration::from_secs(1));
//! assert_eq!(backoff.next(3), Duration::from_secs(8));
//! assert_eq!(backoff.next(10), Duration::from_secs(32));
//!
//! assert_eq!(backoff.delay_for(2, ErrorClass::RateLimited), Some(Duration::from_secs(4)));
//! assert_eq!(backoff.delay_for(0, ErrorClass::Fatal), None);
//! ```

use std::time::Duration;

use crate::policies::{classify::ErrorClass, jitter::JitterPolicy};

/// Retry backoff policy.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Delay before the first retry.
    pub first: Duration,
    /// Maximum delay cap (jitter may add on top, see [`JitterPolicy::Additive`]).
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
    /// Jitter policy to prevent thundering herd.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Returns a strategy with:
    /// - `first = 1s`;
    /// - `factor = 2.0` (doubling);
    /// - `max = 32s`;
    /// - `jitter = Additive { max: 1s }`.
    fn default() -> Self {
        Self {
            first: Duration::from_secs(1),
            max: Duration::from_secs(32),
            factor: 2.0,
            jitter: JitterPolicy::default(),
        }
    }
}

impl BackoffPolicy {
    /// Computes the delay for the given attempt number (0-indexed).
    ///
    /// The base delay is `first × factor^attempt`, clamped to [`BackoffPolicy::max`];
    /// overflowing or non-finite products clamp to `max` as well.
    pub fn next(&self, attempt: u32) -> Duration {
        let max_secs = self.max.as_secs_f64();
        let exp = attempt.min(i32::MAX as u32) as i32;
        let unclamped_secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base =
            if !unclamped_secs.is_finite() || unclamped_secs < 0.0 || unclamped_secs > max_secs {
                self.max
            } else {
                Duration::from_secs_f64(unclamped_secs)
            };

        self.jitter.apply(base)
    }

    /// Delay before re-issuing a call that failed with `class` on `attempt`.
    ///
    /// Returns `None` for [`ErrorClass::Fatal`]: such errors propagate immediately.
    pub fn delay_for(&self, attempt: u32, class: ErrorClass) -> Option<Duration> {
        class.is_retryable().then(|| self.next(attempt))
    }
}
