//! Runtime core: orchestration and lifecycle.
//!
//! The public API from this module is [`Supervisor`], built directly or through
//! [`SupervisorBuilder`] from a [`SupervisorConfig`].
//!
//! Internal modules:
//! - [`runner`]: runs one service, classifies its outcome and publishes events;
//! - [`supervisor`]: registration, the cancel group and the join barrier;
//! - [`shutdown`]: cross-platform interrupt signal handling;
//! - [`meta`]: default application name and version.

mod builder;
mod config;
mod meta;
mod runner;
mod shutdown;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use config::SupervisorConfig;
pub use supervisor::Supervisor;
