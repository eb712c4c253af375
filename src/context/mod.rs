//! # Execution context: cancellation, deadlines, and typed capabilities.
//!
//! A [`Context`] is an immutable node in a tree. Deriving never mutates the parent:
//! - [`Context::with_cancel`] / [`Context::with_deadline`] / [`Context::with_timeout`]
//!   open a new cancel scope and hand back its [`CancelHandle`];
//! - [`Context::with_value`] / [`Context::with_keyed`] bind a capability on a new node.
//!
//! ```text
//! background ──► cancel scope (root) ──► value(Logger) ──► cancel scope (group)
//!                                                             ├──► value(Logger: service=a)
//!                                                             └──► value(Logger: service=b)
//! ```
//!
//! ## Rules
//! - Cancellation is **monotonic**: once [`Context::err`] returns a [`Cause`] it never changes.
//! - A node is done as soon as **any** ancestor is canceled or its earliest deadline passes.
//! - Lookup walks from the node to the root and returns the **nearest** binding, so a
//!   binding on a branch shadows the ancestor only inside that branch.
//! - Looking up an unbound capability never fails: [`Context::value`] returns `None`,
//!   [`get`] returns `T::default()`.

mod node;
mod values;

pub use node::{CancelHandle, Cause, Context};
pub use values::{get, set};
