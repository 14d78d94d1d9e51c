//! # Runtime events emitted by the worker pool, retry loop and completion monitor.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Dispatch events**: a task entered the pool
//! - **Call events**: attempt lifecycle inside the retry loop (starting, backoff, success, failure)
//! - **Drain events**: completion monitor progress and terminal states
//! - **Subscriber events**: delivery problems of the fan-out itself
//!
//! The [`Event`] struct carries optional metadata such as task label, attempt,
//! delay, error class and outstanding count.
//!
//! ## Ordering guarantees
//! Each event has a process-wide sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use drainvisor::{ErrorClass, Event, EventKind};
//!
//! let ev = Event::new(EventKind::BackoffScheduled)
//!     .with_task("get_strategy")
//!     .with_attempt(3)
//!     .with_class(ErrorClass::RateLimited)
//!     .with_delay(Duration::from_secs(8));
//!
//! assert_eq!(ev.kind, EventKind::BackoffScheduled);
//! assert_eq!(ev.task.as_deref(), Some("get_strategy"));
//! assert_eq!(ev.delay_ms, Some(8_000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::policies::ErrorClass;

static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Dispatch ===
    /// A task was registered and handed to the pool.
    ///
    /// Sets: `task`
    TaskSubmitted,

    // === Call lifecycle ===
    /// An attempt is about to invoke the operation.
    ///
    /// Sets: `task`, `attempt` (1-based)
    CallStarting,

    /// Attempt failed with a retriable class; a sleep follows.
    ///
    /// Sets: `task`, `attempt`, `class`, `delay_ms`, `reason`
    BackoffScheduled,

    /// The operation returned a value.
    ///
    /// Sets: `task`, `attempt`
    CallSucceeded,

    /// The operation failed for good (fatal class or attempts exhausted).
    ///
    /// Sets: `task`, `attempt`, `class`, `reason`
    CallFailed,

    // === Drain ===
    /// The outstanding count observed by a monitor changed.
    ///
    /// Sets: `task` (drain label), `outstanding`
    DrainProgress,

    /// A monitor saw a full window of zero samples.
    ///
    /// Sets: `task` (drain label)
    DrainStable,

    /// A monitor exceeded its timeout and entered the grace period.
    ///
    /// Sets: `task` (drain label), `outstanding`
    DrainTimedOut,

    /// A timed-out drain was handed to the escalation hook.
    ///
    /// Sets: `task` (drain label), `reason` (resolution), `outstanding`
    DrainEscalated,

    // === Subscribers ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets: `task` (subscriber name), `reason` (panic info)
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `task` (subscriber name), `reason`
    SubscriberOverflow,
}

/// Runtime event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Process-wide, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Task label (or drain label / subscriber name, depending on kind).
    pub task: Option<Arc<str>>,
    /// Human-readable reason (error text, overflow details, resolution).
    pub reason: Option<Arc<str>>,
    /// Attempt count (starting from 1).
    pub attempt: Option<u32>,
    /// Backoff delay before the next attempt in milliseconds.
    pub delay_ms: Option<u64>,
    /// Retry class of the error that caused this event.
    pub class: Option<ErrorClass>,
    /// Outstanding task count seen by a monitor.
    pub outstanding: Option<usize>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            reason: None,
            attempt: None,
            delay_ms: None,
            class: None,
            outstanding: None,
        }
    }

    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a backoff delay (stored as milliseconds, saturating).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        self
    }

    #[inline]
    pub fn with_class(mut self, class: ErrorClass) -> Self {
        self.class = Some(class);
        self
    }

    #[inline]
    pub fn with_outstanding(mut self, n: usize) -> Self {
        self.outstanding = Some(n);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }
}
