//! # Runtime configuration.
//!
//! [`Config`] centralizes the settings of one coordinator: worker ceiling, retry
//! policy, monitor timings and event bus size. It is passed by value at construction;
//! there is no process-wide configuration.
//!
//! ## Sentinel values
//! - `max_attempts = 0` → unlimited retries of transient errors
//! - `max_workers = 0` → treated as 1 (the pool is always bounded)
//! - `monitor.timeout = 0s` → no overall drain deadline

use crate::monitor::MonitorConfig;
use crate::policies::BackoffPolicy;

/// Configuration for a [`Coordinator`](crate::Coordinator) and its components.
///
/// ## Field semantics
/// - `max_workers`: concurrently executing operations (retry sleeps included)
/// - `backoff`: delay schedule for transient failures
/// - `max_attempts`: attempt bound per operation (`0` = unbounded)
/// - `monitor`: completion monitor timings
/// - `bus_capacity`: event bus ring buffer size (min 1)
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum number of operations running at once.
    ///
    /// Chosen to stay under the remote quota; a worker sleeping in backoff still
    /// occupies its slot.
    pub max_workers: usize,

    /// Backoff schedule for `RateLimited` / `TransientNetwork` failures.
    pub backoff: BackoffPolicy,

    /// Maximum attempts per operation; `0` retries transient errors forever.
    pub max_attempts: u32,

    /// Completion monitor settings.
    pub monitor: MonitorConfig,

    /// Capacity of the event bus broadcast channel.
    pub bus_capacity: usize,
}

impl Config {
    /// Preset for high fan-out workloads (bulk AI calls): 100 workers.
    pub fn bulk() -> Self {
        Self {
            max_workers: 100,
            ..Self::default()
        }
    }

    /// Worker ceiling, never below 1.
    #[inline]
    pub fn worker_limit(&self) -> usize {
        self.max_workers.max(1)
    }

    /// Attempt bound as an `Option` (`None` = unbounded).
    #[inline]
    pub fn attempt_limit(&self) -> Option<u32> {
        match self.max_attempts {
            0 => None,
            n => Some(n),
        }
    }

    /// Bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `max_workers = 3`
    /// - `backoff = BackoffPolicy::default()` (1s doubling to 32s, 1s additive jitter)
    /// - `max_attempts = 0` (unbounded)
    /// - `monitor = MonitorConfig::default()` (900s timeout, 1s polls, 30-sample window, 600s grace)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            max_workers: 3,
            backoff: BackoffPolicy::default(),
            max_attempts: 0,
            monitor: MonitorConfig::default(),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_normalize() {
        let cfg = Config {
            max_workers: 0,
            max_attempts: 0,
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.worker_limit(), 1);
        assert_eq!(cfg.attempt_limit(), None);
        assert_eq!(cfg.bus_capacity_clamped(), 1);

        let cfg = Config {
            max_attempts: 5,
            ..Config::default()
        };
        assert_eq!(cfg.attempt_limit(), Some(5));
    }

    #[test]
    fn presets() {
        assert_eq!(Config::default().worker_limit(), 3);
        assert_eq!(Config::bulk().worker_limit(), 100);
    }
}
