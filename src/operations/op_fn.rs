//! # Function-backed operation (`OpFn`)
//!
//! [`OpFn`] wraps a closure `F: Fn() -> Fut`, producing a fresh future per attempt.
//! Nothing is shared between attempts unless the closure captures it explicitly
//! (typically an `Arc` client handle plus cloned arguments).
//!
//! ## Example
//! ```rust
//! use drainvisor::{CallError, OpFn, OperationRef};
//!
//! let sheet = String::from("Strategy");
//! let op: OperationRef<String, CallError> = OpFn::arc(move || {
//!     let sheet = sheet.clone();
//!     async move { Ok::<_, CallError>(format!("{sheet}!B2")) }
//! });
//! ```

use std::future::Future;
use std::sync::Arc;

use crate::operations::operation::{BoxCallFuture, Operation};

/// Function-backed operation.
pub struct OpFn<F> {
    f: F,
}

impl<F> OpFn<F> {
    /// Wraps a closure. Prefer [`OpFn::arc`] when an [`OperationRef`](crate::OperationRef) is needed.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Wraps a closure and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

impl<F, Fut, T, E> Operation<T, E> for OpFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    fn call(&self) -> BoxCallFuture<T, E> {
        Box::pin((self.f)())
    }
}
