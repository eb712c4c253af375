//! # Event subscribers: the instrumentation sink.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`] fan-out used
//! to deliver run and service markers published on the [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   runner / supervisor ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit
//!                                                                      │
//!                                                         ┌────────────┼────────────┐
//!                                                         ▼            ▼            ▼
//!                                                     LogWriter     Metrics      Custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use servisor::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::ServiceFailed {
//!             // increment failure counter
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "failure-counter"
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub(crate) use set::panic_info;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
