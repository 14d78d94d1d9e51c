//! # CompletionMonitor: decides when a changing set of tasks has drained.
//!
//! ```text
//! Polling ──► Stable                          (window full, every sample zero)
//!    │
//!    └──────► TimedOut ──► GracePeriod ──► StatusSink.report(report)
//!                                             ├─ no hook          ─► Err(DrainTimeout)
//!                                             ├─ hook → Raise     ─► Err(DrainTimeout)
//!                                             └─ hook → Resolved  ─► Err(Escalated)
//! ```
//!
//! Each poll prunes finished entries and records the remaining count. A single zero
//! is not enough: a registry that empties for a moment while the next task is being
//! registered must not look drained, so success needs a full window of zeros.
//!
//! The monitor holds no per-drain state; concurrent `await_drain` calls against
//! different sources are independent.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::{
    config::MonitorConfig,
    escalation::{Escalate, EscalationOutcome, StatusSink, TracingSink},
    report::{DrainReport, Drained},
    window::RollingWindow,
};
use crate::{
    core::{Drain, Snapshot},
    error::MonitorError,
    events::{Bus, Event, EventKind},
};

/// Polls a [`Drain`] source until it is stably empty or the budget runs out.
pub struct CompletionMonitor {
    cfg: MonitorConfig,
    bus: Option<Bus>,
    sink: Arc<dyn StatusSink>,
    escalation: Option<Arc<dyn Escalate>>,
}

impl CompletionMonitor {
    /// Creates a monitor reporting to [`TracingSink`] with no escalation hook.
    pub fn new(cfg: MonitorConfig) -> Self {
        Self {
            cfg,
            bus: None,
            sink: Arc::new(TracingSink),
            escalation: None,
        }
    }

    /// Publishes drain events on `bus`.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Replaces the status sink.
    pub fn with_status_sink(mut self, sink: Arc<dyn StatusSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Installs an escalation hook consulted after a timeout.
    pub fn with_escalation(mut self, hook: Arc<dyn Escalate>) -> Self {
        self.escalation = Some(hook);
        self
    }

    /// Monitor configuration.
    pub fn config(&self) -> &MonitorConfig {
        &self.cfg
    }

    /// Waits until `source` reports zero outstanding tasks for a full stability window.
    ///
    /// Returns [`MonitorError::DrainTimeout`] or [`MonitorError::Escalated`] when the
    /// overall timeout (plus grace period) passes first. Operations themselves are
    /// never cancelled.
    pub async fn await_drain<D>(&self, source: &D, label: &str) -> Result<Drained, MonitorError>
    where
        D: Drain + ?Sized,
    {
        let started = Instant::now();
        let deadline = self.cfg.deadline();
        let every = self.cfg.poll_every();
        let mut window = RollingWindow::new(self.cfg.window_len());
        let mut initial: Option<Vec<String>> = None;
        let mut last_count: Option<usize> = None;
        let mut polls: u64 = 0;

        debug!(
            drain = label,
            window = window.capacity(),
            poll_ms = millis(every),
            "awaiting drain"
        );

        loop {
            let snap = source.prune_and_snapshot();
            polls += 1;
            let initial = initial.get_or_insert_with(|| snap.labels.clone());

            if last_count != Some(snap.remaining) {
                last_count = Some(snap.remaining);
                debug!(drain = label, outstanding = snap.remaining, "drain progress");
                self.publish(
                    Event::new(EventKind::DrainProgress)
                        .with_task(label)
                        .with_outstanding(snap.remaining),
                );
            }

            let elapsed = started.elapsed();
            if deadline.is_some_and(|d| elapsed >= d) {
                let initial = std::mem::take(initial);
                return Err(self.timed_out(source, label, initial, snap).await);
            }

            window.push(snap.remaining);
            if window.is_stable() {
                info!(
                    drain = label,
                    polls,
                    elapsed_ms = millis(elapsed),
                    "drain stable"
                );
                self.publish(
                    Event::new(EventKind::DrainStable)
                        .with_task(label)
                        .with_outstanding(0),
                );
                return Ok(Drained { elapsed, polls });
            }

            tokio::time::sleep(every).await;
        }
    }

    async fn timed_out<D>(
        &self,
        source: &D,
        label: &str,
        initial: Vec<String>,
        at_timeout: Snapshot,
    ) -> MonitorError
    where
        D: Drain + ?Sized,
    {
        let grace = self.cfg.grace_period;
        warn!(
            drain = label,
            outstanding = at_timeout.remaining,
            grace_ms = millis(grace),
            "drain timed out; waiting out grace period"
        );
        self.publish(
            Event::new(EventKind::DrainTimedOut)
                .with_task(label)
                .with_outstanding(at_timeout.remaining),
        );

        if !grace.is_zero() {
            tokio::time::sleep(grace).await;
        }
        let after = source.prune_and_snapshot();

        let report = DrainReport {
            label: label.to_string(),
            timeout: self.cfg.timeout,
            grace,
            initial,
            at_timeout: at_timeout.labels,
            after_grace: after.labels,
        };
        self.sink.report(&report.to_string());

        let Some(hook) = &self.escalation else {
            error!(drain = label, stalled = report.after_grace.len(), "drain failed");
            return MonitorError::DrainTimeout {
                report: Box::new(report),
            };
        };

        match hook.escalate(&report).await {
            EscalationOutcome::Raise => {
                error!(
                    drain = label,
                    stalled = report.after_grace.len(),
                    "drain failed; escalation declined"
                );
                MonitorError::DrainTimeout {
                    report: Box::new(report),
                }
            }
            EscalationOutcome::Resolved { note } => {
                warn!(drain = label, resolution = %note, "drain timeout escalated");
                self.publish(
                    Event::new(EventKind::DrainEscalated)
                        .with_task(label)
                        .with_reason(note.as_str())
                        .with_outstanding(report.after_grace.len()),
                );
                MonitorError::Escalated {
                    report: Box::new(report),
                    resolution: note,
                }
            }
        }
    }

    fn publish(&self, ev: Event) {
        if let Some(bus) = &self.bus {
            bus.publish(ev);
        }
    }
}

impl Default for CompletionMonitor {
    fn default() -> Self {
        Self::new(MonitorConfig::default())
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Completion, TaskEntry, TaskRegistry};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    struct Never;

    impl Completion for Never {
        fn is_done(&self) -> bool {
            false
        }
    }

    #[derive(Clone, Default)]
    struct Flag(Arc<AtomicBool>);

    impl Completion for Flag {
        fn is_done(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }
    }

    #[derive(Default)]
    struct Collect(Mutex<Vec<String>>);

    impl StatusSink for Collect {
        fn report(&self, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }
    }

    struct Fixed(EscalationOutcome);

    #[async_trait]
    impl Escalate for Fixed {
        async fn escalate(&self, _report: &DrainReport) -> EscalationOutcome {
            self.0.clone()
        }
    }

    fn cfg(timeout: u64, grace: u64, window: usize) -> MonitorConfig {
        MonitorConfig {
            timeout: Duration::from_secs(timeout),
            poll_interval: Duration::from_secs(1),
            stability_window: window,
            grace_period: Duration::from_secs(grace),
        }
    }

    #[test]
    fn log_millis_saturate_instead_of_wrapping() {
        assert_eq!(millis(Duration::from_millis(1_500)), 1_500);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_source_drains_after_one_window() {
        let monitor = CompletionMonitor::new(cfg(60, 0, 3));
        let reg = TaskRegistry::new();

        let started = Instant::now();
        let drained = monitor.await_drain(&reg, "empty").await.unwrap();

        assert_eq!(drained.polls, 3);
        assert_eq!(drained.elapsed, Duration::from_secs(2));
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_the_last_entry_then_a_full_window() {
        let monitor = CompletionMonitor::new(cfg(60, 0, 3));
        let reg = Arc::new(TaskRegistry::new());
        let flag = Flag::default();
        reg.append(TaskEntry::new(flag.clone(), "slow"));

        let f = flag.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(4_500)).await;
            f.0.store(true, Ordering::SeqCst);
        });

        let drained = monitor.await_drain(&reg, "one").await.unwrap();
        // Zero first observed at the 5s poll, then 6s and 7s complete the window.
        assert_eq!(drained.elapsed, Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_without_hook_reports_and_raises() {
        let sink = Arc::new(Collect::default());
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let monitor = CompletionMonitor::new(cfg(5, 2, 3))
            .with_bus(bus)
            .with_status_sink(sink.clone());
        let list = Mutex::new(vec![TaskEntry::new(Never, "stuck_op")]);

        let started = Instant::now();
        let err = monitor.await_drain(&list, "batch").await.unwrap_err();

        assert_eq!(started.elapsed(), Duration::from_secs(7));
        assert_eq!(err.as_label(), "drain_timeout");
        let report = err.report();
        assert_eq!(report.initial, vec!["stuck_op"]);
        assert_eq!(report.at_timeout, vec!["stuck_op"]);
        assert_eq!(report.after_grace, vec!["stuck_op"]);

        let messages = sink.0.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("stuck_op"));

        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            kinds.push(ev.kind);
        }
        assert_eq!(kinds, vec![EventKind::DrainProgress, EventKind::DrainTimedOut]);
    }

    #[tokio::test(start_paused = true)]
    async fn escalation_outcomes_never_become_success() {
        let list = Mutex::new(vec![TaskEntry::new(Never, "stuck_op")]);

        let raise = CompletionMonitor::new(cfg(1, 0, 3))
            .with_status_sink(Arc::new(Collect::default()))
            .with_escalation(Arc::new(Fixed(EscalationOutcome::Raise)));
        let err = raise.await_drain(&list, "raise").await.unwrap_err();
        assert!(matches!(err, MonitorError::DrainTimeout { .. }));

        let resolved = CompletionMonitor::new(cfg(1, 0, 3))
            .with_status_sink(Arc::new(Collect::default()))
            .with_escalation(Arc::new(Fixed(EscalationOutcome::Resolved {
                note: "flagged row in control sheet".into(),
            })));
        match resolved.await_drain(&list, "resolve").await.unwrap_err() {
            MonitorError::Escalated { report, resolution } => {
                assert_eq!(resolution, "flagged row in control sheet");
                assert_eq!(report.label, "resolve");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn grace_period_records_late_completions() {
        let flag = Flag::default();
        let list = Arc::new(Mutex::new(vec![
            TaskEntry::new(flag.clone(), "late"),
            TaskEntry::new(Never, "stuck"),
        ]));
        let monitor =
            CompletionMonitor::new(cfg(2, 3, 3)).with_status_sink(Arc::new(Collect::default()));

        let f = flag.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(3_500)).await;
            f.0.store(true, Ordering::SeqCst);
        });

        let err = monitor.await_drain(&list, "mixed").await.unwrap_err();
        let report = err.report();
        assert_eq!(report.at_timeout, vec!["late", "stuck"]);
        assert_eq!(report.after_grace, vec!["stuck"]);
        assert_eq!(report.recovered_during_grace(), vec!["late"]);
    }
}
