//! # Operations and catalogs.
//!
//! - [`Operation`] re-issuable, zero-argument remote call
//! - [`OpFn`] closure-backed operation
//! - [`OperationRef`] shared reference (`Arc<dyn Operation<T, E>>`)
//! - [`Catalog`] / [`OperationTable`] name → operation resolution

mod catalog;
mod op_fn;
mod operation;

pub use catalog::{Catalog, OperationTable};
pub use op_fn::OpFn;
pub use operation::{BoxCallFuture, Operation, OperationRef};
