//! Retry policies.
//!
//! This module groups the knobs that control **whether** a failed remote call is
//! retried and **how long** to wait before the next attempt.
//!
//! ## Contents
//! - [`ErrorClass`] / [`Classify`] three-way classification of a caught error
//! - [`BackoffPolicy`] how retry delays evolve (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization strategy to avoid thundering herd
//!
//! ## Quick wiring
//! ```text
//! Config { backoff: BackoffPolicy, max_attempts: u32, .. }
//!      └─► core::caller::RetryingCaller uses:
//!           - err.class() to decide retry / propagate
//!           - backoff.delay_for(attempt, class) to schedule the next attempt
//! ```
//!
//! ## Defaults
//! - `BackoffPolicy::default()` → first=1s, factor=2.0, max=32s, jitter=Additive(1s).
//! - `Fatal` errors are never retried.

mod backoff;
mod classify;
mod jitter;

pub use backoff::BackoffPolicy;
pub use classify::{Classify, ErrorClass};
pub use jitter::JitterPolicy;
