//! # Named operation catalogs.
//!
//! The worker pool dispatches operations by name: a [`Catalog`] resolves
//! `(name, args)` into a ready-to-run [`OperationRef`]. [`OperationTable`] is the
//! stock implementation, a map from names to argument-binding factories.
//!
//! ```text
//! submit("get_strategy", args)
//!     └─► catalog.resolve("get_strategy", args)
//!             └─► factory(args) ─► OperationRef (args captured, re-issuable)
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::operations::operation::{Operation, OperationRef};
use crate::policies::Classify;

/// Resolves operation names to runnable operations.
pub trait Catalog: Send + Sync + 'static {
    /// Arguments bound into an operation at submission time.
    type Args: Send + 'static;
    /// Success value of every operation in this catalog.
    type Output: Send + 'static;
    /// Error type of every operation in this catalog.
    type Error: Classify + fmt::Display + Send + 'static;

    /// Returns the operation registered under `name` with `args` bound, or `None`.
    fn resolve(
        &self,
        name: &str,
        args: Self::Args,
    ) -> Option<OperationRef<Self::Output, Self::Error>>;
}

type Factory<A, T, E> = Arc<dyn Fn(A) -> OperationRef<T, E> + Send + Sync>;

/// Name → factory table implementing [`Catalog`].
///
/// # Example
/// ```
/// use drainvisor::{CallError, Catalog, OpFn, OperationTable};
///
/// let table: OperationTable<(String, u32), String, CallError> = OperationTable::new()
///     .register("read_row", |(sheet, row): (String, u32)| {
///         OpFn::arc(move || {
///             let sheet = sheet.clone();
///             async move { Ok::<_, CallError>(format!("{sheet}:{row}")) }
///         })
///     });
///
/// assert!(table.resolve("read_row", ("Leads".into(), 4)).is_some());
/// assert!(table.resolve("write_row", ("Leads".into(), 4)).is_none());
/// ```
pub struct OperationTable<A, T, E> {
    entries: HashMap<String, Factory<A, T, E>>,
}

impl<A, T, E> OperationTable<A, T, E>
where
    A: Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registers `factory` under `name`, replacing any previous entry.
    pub fn register<F, O>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(A) -> Arc<O> + Send + Sync + 'static,
        O: Operation<T, E>,
    {
        let factory: Factory<A, T, E> = Arc::new(move |args| {
            let op: OperationRef<T, E> = factory(args);
            op
        });
        self.entries.insert(name.into(), factory);
        self
    }

    /// Returns true if an operation is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the sorted list of registered names.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

impl<A, T, E> Default for OperationTable<A, T, E>
where
    A: Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<A, T, E> Catalog for OperationTable<A, T, E>
where
    A: Send + 'static,
    T: Send + 'static,
    E: Classify + fmt::Display + Send + 'static,
{
    type Args = A;
    type Output = T;
    type Error = E;

    fn resolve(&self, name: &str, args: A) -> Option<OperationRef<T, E>> {
        self.entries.get(name).map(|factory| factory(args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CallError, OpFn};

    fn table() -> OperationTable<u32, u32, CallError> {
        OperationTable::new()
            .register("double", |n: u32| {
                OpFn::arc(move || async move { Ok::<_, CallError>(n * 2) })
            })
            .register("reject", |n: u32| {
                OpFn::arc(move || async move {
                    Err::<u32, _>(CallError::Fatal {
                        reason: format!("bad input {n}"),
                    })
                })
            })
    }

    #[tokio::test]
    async fn resolves_and_binds_arguments() {
        let t = table();
        let op = t.resolve("double", 21).unwrap();
        assert_eq!(op.call().await, Ok(42));
        assert_eq!(op.call().await, Ok(42));

        let op = t.resolve("reject", 7).unwrap();
        assert!(matches!(op.call().await, Err(CallError::Fatal { .. })));
    }

    #[test]
    fn unknown_names_miss() {
        let t = table();
        assert!(t.resolve("triple", 1).is_none());
        assert!(t.contains("double"));
        assert_eq!(t.names(), vec!["double".to_string(), "reject".to_string()]);
    }
}
