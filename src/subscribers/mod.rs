//! # Event subscribers.
//!
//! [`Subscribe`] is the extension point; [`SubscriberSet`] fans events out to every
//! subscriber through bounded per-subscriber queues.
//!
//! ```text
//! RetryingCaller / WorkerPool / Monitor ── publish ──► Bus
//!                                                      │
//!                                          Coordinator listener
//!                                                      │
//!                                               SubscriberSet::emit
//!                                         ┌────────────┼────────────┐
//!                                         ▼            ▼            ▼
//!                                      metrics       audit        custom
//! ```

mod set;
mod subscribe;

pub use set::SubscriberSet;
pub use subscribe::Subscribe;

pub(crate) use set::panic_message;
