//! # Runtime events emitted by the supervisor and its services.
//!
//! The [`EventKind`] enum classifies events in three groups:
//! - **Run markers**: a supervisor run started/finished, the group was canceled;
//! - **Service markers**: a service is starting, stopped, or failed;
//! - **Subscriber health**: a subscriber panicked or dropped an event.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use servisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ServiceFailed)
//!     .with_service("http")
//!     .with_reason("address in use");
//!
//! assert_eq!(ev.kind, EventKind::ServiceFailed);
//! assert_eq!(ev.service.as_deref(), Some("http"));
//! assert_eq!(ev.reason.as_deref(), Some("address in use"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Run markers ===
    /// `Supervisor::run` started and is about to spawn services.
    ///
    /// Sets:
    /// - `service`: supervisor (app) name
    RunStarting,

    /// `Supervisor::run` is about to return.
    ///
    /// Sets:
    /// - `service`: supervisor (app) name
    /// - `reason`: returned error, if any
    RunFinished,

    /// The shared group context was canceled because a service failed.
    ///
    /// Sets:
    /// - `service`: failing service
    /// - `reason`: failure message
    GroupCanceled,

    /// An interrupt signal was observed and the root context canceled.
    InterruptReceived,

    // === Service markers ===
    /// A service is about to run.
    ///
    /// Sets:
    /// - `service`: service name
    ServiceStarting,

    /// A service returned `Ok` or a benign error (context canceled/deadline exceeded).
    ///
    /// Sets:
    /// - `service`: service name
    /// - `reason`: benign error, if any
    ServiceStopped,

    /// A service returned a real error or panicked.
    ///
    /// Sets:
    /// - `service`: service name
    /// - `reason`: failure message
    ServiceFailed,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `service`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `service`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the service (or subscriber), if applicable.
    pub service: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            service: None,
            reason: None,
        }
    }

    /// Attaches a service name.
    #[inline]
    pub fn with_service(mut self, service: impl Into<Arc<str>>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_service(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_service(subscriber)
            .with_reason(info)
    }

    /// `true` for the final event of a run.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, EventKind::RunFinished)
    }
}
