//! # Completion monitoring.
//!
//! - [`CompletionMonitor`] polls a [`Drain`](crate::Drain) source until it is stably empty
//! - [`MonitorConfig`] timeout, poll interval, stability window, grace period
//! - [`RollingWindow`] the last N outstanding counts
//! - [`DrainReport`] / [`Drained`] timeout diagnostic and success summary
//! - [`StatusSink`] / [`Escalate`] what happens to a timeout report

mod config;
mod drain;
mod escalation;
mod report;
mod window;

pub use config::MonitorConfig;
pub use drain::CompletionMonitor;
pub use escalation::{Escalate, EscalationOutcome, StatusSink, TracingSink};
pub use report::{DrainReport, Drained};
pub use window::RollingWindow;
