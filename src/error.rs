//! Error types used by the drainvisor runtime and remote calls.
//!
//! - [`CallError`] a ready-made classifiable error for remote operations.
//! - [`PoolError`] submission-time failures of the worker pool.
//! - [`TaskError`] what an awaited [`TaskHandle`](crate::TaskHandle) yields on failure.
//! - [`MonitorError`] the completion monitor giving up on a drain.
//!
//! All types provide `as_label` (stable snake_case, for logs/metrics) and `as_message`.

use thiserror::Error;

use crate::monitor::DrainReport;
use crate::policies::{Classify, ErrorClass};

/// # Remote call failure with its retry class baked in.
///
/// Operations that talk to an SDK with its own error types usually implement
/// [`Classify`] on those types instead. `CallError` covers the common case where the
/// caller maps a status code or message into one of the three classes.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    /// Remote quota exceeded.
    #[error("rate limited: {reason}")]
    RateLimited {
        /// Remote error text.
        reason: String,
    },

    /// Connection reset, protocol error, gateway failure.
    #[error("transient network failure: {reason}")]
    Network {
        /// Remote error text.
        reason: String,
    },

    /// Non-retriable failure (malformed request, permission, missing resource).
    #[error("fatal error (no retry): {reason}")]
    Fatal {
        /// Remote error text.
        reason: String,
    },
}

impl CallError {
    /// Maps an API status code and message into a classified error.
    ///
    /// - `429`, or a message mentioning an exceeded quota / rate limit → `RateLimited`
    /// - `408`, `5xx` → `Network`
    /// - anything else → `Fatal`
    ///
    /// # Example
    /// ```
    /// use drainvisor::{CallError, Classify, ErrorClass};
    ///
    /// assert_eq!(CallError::from_status(503, "backend unavailable").class(), ErrorClass::TransientNetwork);
    /// assert_eq!(CallError::from_status(400, "Unable to parse range").class(), ErrorClass::Fatal);
    /// ```
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let reason = message.into();
        let lower = reason.to_ascii_lowercase();
        if status == 429 || lower.contains("quota exceeded") || lower.contains("rate limit") {
            CallError::RateLimited { reason }
        } else if status == 408 || (500..600).contains(&status) {
            CallError::Network { reason }
        } else {
            CallError::Fatal { reason }
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            CallError::RateLimited { .. } => "call_rate_limited",
            CallError::Network { .. } => "call_network",
            CallError::Fatal { .. } => "call_fatal",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            CallError::RateLimited { reason } => format!("rate limited: {reason}"),
            CallError::Network { reason } => format!("network: {reason}"),
            CallError::Fatal { reason } => format!("fatal: {reason}"),
        }
    }
}

impl Classify for CallError {
    fn class(&self) -> ErrorClass {
        match self {
            CallError::RateLimited { .. } => ErrorClass::RateLimited,
            CallError::Network { .. } => ErrorClass::TransientNetwork,
            CallError::Fatal { .. } => ErrorClass::Fatal,
        }
    }
}

/// # Errors produced when submitting work to the pool.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The pool was closed and accepts no new work.
    #[error("worker pool is closed")]
    Closed,

    /// The operation catalog has no entry under this name.
    #[error("unknown operation: {name}")]
    UnknownOperation {
        /// The requested operation name.
        name: String,
    },

    /// Submission happened outside of a tokio runtime.
    #[error("no async runtime available to dispatch work")]
    NoRuntime,
}

impl PoolError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use drainvisor::PoolError;
    ///
    /// assert_eq!(PoolError::Closed.as_label(), "pool_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            PoolError::Closed => "pool_closed",
            PoolError::UnknownOperation { .. } => "pool_unknown_operation",
            PoolError::NoRuntime => "pool_no_runtime",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            PoolError::Closed => "pool closed".to_string(),
            PoolError::UnknownOperation { name } => format!("unknown operation: {name}"),
            PoolError::NoRuntime => "no runtime".to_string(),
        }
    }
}

/// # Failure observed through a [`TaskHandle`](crate::TaskHandle).
///
/// `E` is the operation's own error type; transient errors never show up here unless
/// a retry bound was configured and exhausted.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError<E> {
    /// The operation returned a non-retriable error (or exhausted its attempts).
    #[error("operation failed: {0}")]
    Failed(E),

    /// The pool was closed before the operation got a worker.
    #[error("worker pool closed before the operation started")]
    PoolClosed,

    /// The operation panicked on its worker.
    #[error("operation panicked: {reason}")]
    Panicked {
        /// Panic payload, if it was a string.
        reason: String,
    },

    /// The underlying task was aborted by the runtime (e.g. runtime shutdown).
    #[error("operation aborted")]
    Aborted,
}

impl<E> TaskError<E> {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Failed(_) => "task_failed",
            TaskError::PoolClosed => "task_pool_closed",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Aborted => "task_aborted",
        }
    }

    /// Returns the operation error, if that is what failed.
    pub fn into_failed(self) -> Option<E> {
        match self {
            TaskError::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// # Errors raised by the completion monitor.
///
/// Both variants carry the full [`DrainReport`] so callers can tell which named
/// operations stalled.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Outstanding work did not reach a stable empty state within budget.
    #[error("{report}")]
    DrainTimeout {
        /// Initial / at-timeout / post-grace snapshots.
        report: Box<DrainReport>,
    },

    /// The drain timed out and an escalation hook reported a corrective action.
    #[error("{report}\nEscalation: {resolution}")]
    Escalated {
        /// Initial / at-timeout / post-grace snapshots.
        report: Box<DrainReport>,
        /// What the operator or controller did about it.
        resolution: String,
    },
}

impl MonitorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            MonitorError::DrainTimeout { .. } => "drain_timeout",
            MonitorError::Escalated { .. } => "drain_escalated",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            MonitorError::DrainTimeout { report } => {
                format!("drain timed out; stuck after grace={:?}", report.after_grace)
            }
            MonitorError::Escalated { report, resolution } => format!(
                "drain escalated ({resolution}); stuck after grace={:?}",
                report.after_grace
            ),
        }
    }

    /// The diagnostic report attached to this error.
    pub fn report(&self) -> &DrainReport {
        match self {
            MonitorError::DrainTimeout { report } | MonitorError::Escalated { report, .. } => {
                &**report
            }
        }
    }
}
