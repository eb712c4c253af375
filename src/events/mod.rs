//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to publish
//! supervisor and service lifecycle markers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Supervisor::run`, the per-service runner, the interrupt watcher,
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumer**: the supervisor's listener, which fans out to the `SubscriberSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
