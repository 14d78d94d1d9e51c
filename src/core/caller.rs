//! # RetryingCaller: one operation, retried until it sticks.
//!
//! Executes a single [`Operation`] and absorbs transient failures:
//! - classifies every error via [`Classify`],
//! - sleeps per [`BackoffPolicy`] on the current task only,
//! - re-issues the same operation from scratch.
//!
//! ## Flow
//! ```text
//! loop {
//!   ├─► attempt += 1, publish CallStarting
//!   ├─► op.call().await
//!   │     ├─ Ok           ─► publish CallSucceeded, return Ok
//!   │     └─ Err(e)       ─► class = e.class()
//!   │           ├─ Fatal                  ─► publish CallFailed, return Err(e)
//!   │           ├─ attempt limit reached  ─► publish CallFailed, return Err(e)
//!   │           └─ RateLimited / Network  ─► warn!, publish BackoffScheduled
//!   │                                        sleep(backoff.delay_for(attempt, class))
//! }
//! ```
//!
//! ## Rules
//! - Attempt state is local to one `execute` call; nothing is shared between calls.
//! - Without an attempt limit, transient errors are retried indefinitely: remote
//!   quotas reset on a clock, not on a retry count.
//! - Non-retriable errors propagate unchanged.
//! - Each attempt runs inside a `call{task, attempt}` debug span, so logs emitted by
//!   the operation and the backoff warning carry the attempt they belong to.

use std::fmt;
use std::time::Duration;

use tracing::{Instrument, debug, debug_span, warn};

use crate::{
    events::{Bus, Event, EventKind},
    operations::Operation,
    policies::{BackoffPolicy, Classify, ErrorClass},
};

/// Executes operations with classification-driven retry and backoff.
#[derive(Clone, Debug)]
pub struct RetryingCaller {
    backoff: BackoffPolicy,
    max_attempts: Option<u32>,
    bus: Bus,
}

impl RetryingCaller {
    /// Creates a caller with unbounded retries.
    pub fn new(backoff: BackoffPolicy, bus: Bus) -> Self {
        Self {
            backoff,
            max_attempts: None,
            bus,
        }
    }

    /// Bounds the total number of attempts (`None` = unbounded).
    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts.filter(|n| *n > 0);
        self
    }

    /// Runs `op` until it succeeds, fails fatally, or exhausts the attempt limit.
    pub async fn execute<T, E>(&self, label: &str, op: &dyn Operation<T, E>) -> Result<T, E>
    where
        T: 'static,
        E: Classify + fmt::Display + 'static,
    {
        let mut attempt: u32 = 0;

        loop {
            attempt = attempt.saturating_add(1);
            let span = debug_span!("call", task = label, attempt);
            self.bus.publish(
                Event::new(EventKind::CallStarting)
                    .with_task(label)
                    .with_attempt(attempt),
            );

            let err = match op.call().instrument(span.clone()).await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(task = label, attempts = attempt, "call succeeded after retries");
                    }
                    self.bus.publish(
                        Event::new(EventKind::CallSucceeded)
                            .with_task(label)
                            .with_attempt(attempt),
                    );
                    return Ok(value);
                }
                Err(err) => err,
            };

            let class = err.class();
            let Some(delay) = self.backoff.delay_for(attempt - 1, class) else {
                debug!(task = label, attempt, error = %err, "non-retriable failure");
                self.publish_failed(label, attempt, class, err.to_string());
                return Err(err);
            };

            if self.max_attempts.is_some_and(|max| attempt >= max) {
                warn!(
                    task = label,
                    attempt,
                    class = class.as_label(),
                    error = %err,
                    "retry attempts exhausted"
                );
                self.publish_failed(label, attempt, class, "attempts_exhausted");
                return Err(err);
            }

            span.in_scope(|| self.log_transient(label, attempt, class, delay, &err));
            self.bus.publish(
                Event::new(EventKind::BackoffScheduled)
                    .with_task(label)
                    .with_attempt(attempt)
                    .with_class(class)
                    .with_delay(delay)
                    .with_reason(err.to_string()),
            );
            drop(err);

            tokio::time::sleep(delay).await;
        }
    }

    fn log_transient(
        &self,
        label: &str,
        attempt: u32,
        class: ErrorClass,
        delay: Duration,
        err: &dyn fmt::Display,
    ) {
        let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        match class {
            ErrorClass::RateLimited => warn!(
                task = label,
                attempt,
                delay_ms,
                error = %err,
                "remote quota exceeded; backing off"
            ),
            _ => warn!(
                task = label,
                attempt,
                delay_ms,
                class = class.as_label(),
                error = %err,
                "transient call failure; backing off"
            ),
        }
    }

    fn publish_failed(
        &self,
        label: &str,
        attempt: u32,
        class: ErrorClass,
        reason: impl Into<std::sync::Arc<str>>,
    ) {
        self.bus.publish(
            Event::new(EventKind::CallFailed)
                .with_task(label)
                .with_attempt(attempt)
                .with_class(class)
                .with_reason(reason),
        );
    }
}
