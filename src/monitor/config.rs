//! Completion monitor timings.

use std::time::Duration;

/// Timing configuration of a [`CompletionMonitor`](crate::CompletionMonitor).
///
/// ## Sentinel values
/// - `timeout = 0s` → wait forever for a stable drain
/// - `poll_interval` below 1ms → 1ms
/// - `stability_window = 0` → 1 sample
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Overall budget before the drain is declared timed out.
    pub timeout: Duration,
    /// Delay between two registry polls.
    pub poll_interval: Duration,
    /// Consecutive zero samples required before declaring the drain complete.
    pub stability_window: usize,
    /// Extra wait after a timeout before the final snapshot is taken.
    pub grace_period: Duration,
}

impl MonitorConfig {
    /// Overall deadline, or `None` when `timeout` is zero.
    #[inline]
    pub fn deadline(&self) -> Option<Duration> {
        (!self.timeout.is_zero()).then_some(self.timeout)
    }

    /// Poll interval clamped to at least 1ms.
    #[inline]
    pub fn poll_every(&self) -> Duration {
        self.poll_interval.max(Duration::from_millis(1))
    }

    /// Stability window length clamped to at least one sample.
    #[inline]
    pub fn window_len(&self) -> usize {
        self.stability_window.max(1)
    }
}

impl Default for MonitorConfig {
    /// 900s timeout, 1s polls, 30-sample stability window, 600s grace.
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(900),
            poll_interval: Duration::from_secs(1),
            stability_window: 30,
            grace_period: Duration::from_secs(600),
        }
    }
}
