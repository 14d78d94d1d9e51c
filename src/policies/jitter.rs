//! # Jitter policy for retry delays.
//!
//! [`JitterPolicy`] adds randomness to backoff delays so that workers hitting the
//! same quota wall do not all come back at the same instant.
//!
//! - [`JitterPolicy::None`] no randomization, predictable delays
//! - [`JitterPolicy::Additive`] delay + random[0, max] (bounded independently of the delay)
//! - [`JitterPolicy::Full`] random delay in [0, delay]
//! - [`JitterPolicy::Equal`] delay/2 + random[0, delay/2]

use rand::Rng;
use std::time::Duration;

/// Policy controlling randomization of retry delays.
///
/// ## Trade-offs
/// - **None**: Predictable, but risks synchronized retries
/// - **Additive**: Never shortens the exponential term; spread is fixed
/// - **Full**: Maximum spread, may retry almost immediately
/// - **Equal**: Keeps at least half of the computed delay
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JitterPolicy {
    /// No jitter: use the exact backoff delay.
    None,

    /// Additive jitter: delay + random[0, max].
    ///
    /// The random part is bounded by `max` regardless of how large the
    /// exponential term has grown.
    Additive {
        /// Upper bound of the random addition.
        max: Duration,
    },

    /// Full jitter: random delay in [0, delay].
    Full,

    /// Equal jitter: delay/2 + random[0, delay/2].
    Equal,
}

impl Default for JitterPolicy {
    /// Returns one second of additive jitter.
    fn default() -> Self {
        JitterPolicy::Additive {
            max: Duration::from_secs(1),
        }
    }
}

impl JitterPolicy {
    /// Applies jitter to the given delay.
    pub fn apply(&self, delay: Duration) -> Duration {
        match self {
            JitterPolicy::None => delay,
            JitterPolicy::Additive { max } => delay.saturating_add(random_up_to(*max)),
            JitterPolicy::Full => random_up_to(delay),
            JitterPolicy::Equal => {
                let half = delay / 2;
                half.saturating_add(random_up_to(half))
            }
        }
    }
}

/// Uniform random duration in [0, bound], millisecond resolution.
fn random_up_to(bound: Duration) -> Duration {
    let ms = u64::try_from(bound.as_millis()).unwrap_or(u64::MAX);
    if ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(0..=ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_identity() {
        let d = Duration::from_millis(1234);
        assert_eq!(JitterPolicy::None.apply(d), d);
    }

    #[test]
    fn additive_stays_within_bound() {
        let jitter = JitterPolicy::Additive {
            max: Duration::from_millis(500),
        };
        for _ in 0..200 {
            let d = jitter.apply(Duration::from_secs(4));
            assert!(d >= Duration::from_secs(4));
            assert!(d <= Duration::from_millis(4500));
        }
    }

    #[test]
    fn additive_bound_does_not_scale_with_delay() {
        let jitter = JitterPolicy::Additive {
            max: Duration::from_millis(10),
        };
        for _ in 0..200 {
            let d = jitter.apply(Duration::from_secs(60));
            assert!(d <= Duration::from_millis(60_010));
        }
    }

    #[test]
    fn full_and_equal_bounds() {
        let base = Duration::from_millis(1000);
        for _ in 0..200 {
            assert!(JitterPolicy::Full.apply(base) <= base);

            let eq = JitterPolicy::Equal.apply(base);
            assert!(eq >= Duration::from_millis(500));
            assert!(eq <= base);
        }
    }

    #[test]
    fn zero_delay_stays_zero() {
        assert_eq!(JitterPolicy::Full.apply(Duration::ZERO), Duration::ZERO);
        assert_eq!(JitterPolicy::Equal.apply(Duration::ZERO), Duration::ZERO);
    }
}
