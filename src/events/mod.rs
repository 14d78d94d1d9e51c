//! Runtime events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `RetryingCaller`, `WorkerPool`, `CompletionMonitor`,
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the `Coordinator` listener (fans out to `SubscriberSet`) and any
//!   receiver obtained through [`Bus::subscribe`].

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
