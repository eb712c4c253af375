//! # servisor
//!
//! **Servisor** runs a set of long-lived async services together and stops them together.
//!
//! Every service receives a [`Context`]: a cancellation signal with an optional deadline
//! and a bag of capabilities (the logger among them). The first service that fails cancels
//! the shared context for all of its siblings; the supervisor then waits for every service
//! to return and reports that first failure. Services never restart.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   Service    │   │   Service    │   │   Service    │
//!     │  (http api)  │   │  (consumer)  │   │   (ticker)   │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor                                                       │
//! │  - Context root (caller-supplied, or canceled on SIGINT/SIGTERM)  │
//! │  - Group scope (canceled on the first failure)                    │
//! │  - Logger (app + version fields, one child per service)           │
//! │  - Bus + SubscriberSet (run and service markers)                  │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     run_service        run_service        run_service
//!      │ publishes:       │                  │
//!      │ - ServiceStarting│                  │
//!      │ - ServiceStopped │                  │
//!      │ - ServiceFailed  │                  │
//!      ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │              (capacity: SupervisorConfig::bus_capacity)           │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                        SubscriberSet (per-sub queues)
//!                          ┌─────────┼─────────┐
//!                          ▼         ▼         ▼
//!                       worker1   worker2   workerN
//! ```
//!
//! ### Lifecycle
//! ```text
//! Supervisor::new ──► add_service(..) ──► run()
//!
//! run():
//!   ├─► Created → Running (later add_service calls are rejected)
//!   ├─► publish RunStarting
//!   ├─► spawn every service on the group scope
//!   ├─► join barrier:
//!   │     ├─ Ok / Canceled / DeadlineExceeded ─► normal stop
//!   │     └─ other error or panic ─► first one? cancel group, publish GroupCanceled
//!   ├─► cancel group and root scopes
//!   └─► publish RunFinished, return first error or Ok
//! ```
//!
//! ## Features
//! | Area              | Description                                                       | Key types / traits                         |
//! |-------------------|-------------------------------------------------------------------|--------------------------------------------|
//! | **Context**       | Cancellation, deadlines, typed and keyed capability lookup.        | [`Context`], [`CancelHandle`], [`Cause`]   |
//! | **Services**      | Define services as trait objects or closures.                     | [`Service`], [`ServiceFn`], [`ServiceRef`] |
//! | **Supervision**   | Run services together, stop them together.                        | [`Supervisor`], [`SupervisorBuilder`]      |
//! | **Logging**       | Context-carried structured logger built on `tracing`.              | [`Logger`], [`LogFormat`]                  |
//! | **Subscriber API**| Hook into run and service markers.                                | [`Subscribe`], [`Event`], [`EventKind`]    |
//! | **Errors**        | Typed errors for services and the supervisor.                     | [`ServiceError`], [`SupervisorError`]      |
//! | **Configuration** | Centralize supervisor settings.                                   | [`SupervisorConfig`]                       |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] subscriber _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use servisor::{Context, ServiceError, ServiceFn, Supervisor};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // The caller owns cancellation: stop everything after 100ms.
//!     let (ctx, _cancel) = Context::background().with_timeout(Duration::from_millis(100));
//!     let sup = Supervisor::with_context(ctx, "hello", "1.0.0");
//!
//!     sup.add_service(ServiceFn::arc("hello", |ctx: Context| async move {
//!         ctx.logger().info("hello from service");
//!         Err::<(), ServiceError>(ctx.done().await.into())
//!     }))?;
//!
//!     // Deadline expiry is a normal stop.
//!     sup.run().await?;
//!     Ok(())
//! }
//! ```
pub mod context;
mod core;
mod error;
mod events;
mod logging;
mod services;
mod subscribers;

// ---- Public re-exports ----

pub use context::{CancelHandle, Cause, Context};
pub use core::{Supervisor, SupervisorBuilder, SupervisorConfig};
pub use error::{BoxError, ServiceError, SupervisorError};
pub use events::{Bus, Event, EventKind};
pub use logging::{LogFormat, Logger};
pub use services::{Service, ServiceFn, ServiceRef};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
