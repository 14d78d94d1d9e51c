//! # Timeout hand-off points.
//!
//! When a drain times out the monitor talks to two injectable collaborators:
//! - a [`StatusSink`], which always receives the rendered [`DrainReport`];
//! - an optional [`Escalate`] hook, which lets a human or an external controller look
//!   at the report and decide what happens next.
//!
//! Neither can turn a timeout into success: the monitor maps every
//! [`EscalationOutcome`] to an error.

use async_trait::async_trait;
use tracing::warn;

use super::report::DrainReport;

/// Diagnostic surface for timeout reports.
pub trait StatusSink: Send + Sync + 'static {
    /// Receives one human-readable message.
    fn report(&self, message: &str);
}

impl<F> StatusSink for F
where
    F: Fn(&str) + Send + Sync + 'static,
{
    fn report(&self, message: &str) {
        self(message)
    }
}

/// Default sink: logs the report at `warn` level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl StatusSink for TracingSink {
    fn report(&self, message: &str) {
        warn!(target: "drainvisor::status", "{message}");
    }
}

/// Decision returned by an escalation hook.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EscalationOutcome {
    /// Nothing was done; raise the timeout as is.
    Raise,
    /// A corrective action was taken; `note` says what it was.
    Resolved {
        /// Free-form description of the action.
        note: String,
    },
}

/// Human-in-the-loop (or controller) hook consulted after a drain timeout.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use drainvisor::{DrainReport, Escalate, EscalationOutcome};
///
/// struct Pager;
///
/// #[async_trait]
/// impl Escalate for Pager {
///     async fn escalate(&self, report: &DrainReport) -> EscalationOutcome {
///         if report.stalled().is_empty() {
///             EscalationOutcome::Raise
///         } else {
///             EscalationOutcome::Resolved { note: format!("paged on-call for {}", report.label) }
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Escalate: Send + Sync + 'static {
    /// Inspects the report and decides how the timeout is surfaced.
    async fn escalate(&self, report: &DrainReport) -> EscalationOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn closures_are_sinks() {
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let s = seen.clone();
        let sink = move |msg: &str| s.lock().unwrap().push(msg.to_string());

        sink.report("first");
        TracingSink.report("logged only");
        assert_eq!(*seen.lock().unwrap(), vec!["first"]);
    }
}
