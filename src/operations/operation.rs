//! # Operation abstraction.
//!
//! An [`Operation`] is one deferred remote call. It takes no arguments (they are bound
//! when the operation is built) and may be invoked many times: the retry loop
//! re-issues it from scratch after every transient failure, so implementations must be
//! idempotent or otherwise safe to repeat.
//!
//! The shared handle type is [`OperationRef`], an `Arc<dyn Operation<T, E>>`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future produced by one invocation of an operation.
pub type BoxCallFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'static>>;

/// Shared reference to an operation.
pub type OperationRef<T, E> = Arc<dyn Operation<T, E>>;

/// # Re-issuable unit of remote work.
///
/// # Example
/// ```
/// use drainvisor::{CallError, Operation};
///
/// struct ReadCell { row: u32, col: u32 }
///
/// impl Operation<String, CallError> for ReadCell {
///     fn call(&self) -> drainvisor::BoxCallFuture<String, CallError> {
///         let (row, col) = (self.row, self.col);
///         Box::pin(async move { Ok(format!("R{row}C{col}")) })
///     }
/// }
/// ```
pub trait Operation<T, E>: Send + Sync + 'static {
    /// Starts one attempt of the remote call.
    fn call(&self) -> BoxCallFuture<T, E>;
}
