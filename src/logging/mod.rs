//! # Logger capability.
//!
//! The supervisor never installs a global `tracing` subscriber. Instead it resolves a
//! [`Logger`] (a `tracing::Dispatch` plus a span carrying structured fields) and binds
//! it into the context:
//!
//! ```text
//! Logger (sink)  ──with_app(name, version)──►  app span  ──with_service(name)──►  service span
//!       ▲                                         │                                   │
//!  LogFormat::Auto                       bound on the root context       bound on each service branch
//!  (terminal? pretty : json)
//! ```
//!
//! Services reach it with [`Context::logger`](crate::Context::logger), or simply call
//! `tracing::info!` from inside `run`: the service future is polled with the logger's
//! dispatcher as the default and inside the service span.

#[cfg(test)]
pub(crate) mod capture;
mod format;
mod logger;

pub use format::LogFormat;
pub use logger::Logger;
