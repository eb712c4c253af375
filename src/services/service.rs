//! # Service abstraction.
//!
//! A service receives the per-service [`Context`] and runs until it is done or the
//! context ends. Cancellation is cooperative: the supervisor only signals and waits,
//! so a service that never looks at its context keeps `Supervisor::run` waiting.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::Context;
use crate::error::ServiceError;

/// Shared handle to a service.
pub type ServiceRef = Arc<dyn Service>;

/// # Named, long-lived unit of work.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use servisor::{Context, Service, ServiceError};
///
/// struct Heartbeat;
///
/// #[async_trait]
/// impl Service for Heartbeat {
///     fn name(&self) -> &str { "heartbeat" }
///
///     async fn run(&self, ctx: Context) -> Result<(), ServiceError> {
///         loop {
///             tokio::select! {
///                 cause = ctx.done() => return Err(cause.into()),
///                 _ = tokio::time::sleep(std::time::Duration::from_secs(1)) => {
///                     ctx.logger().debug("beat");
///                 }
///             }
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Service: Send + Sync + 'static {
    /// Returns a human-readable name used for logging and events.
    ///
    /// Names are labels, not identities: two services may share one.
    fn name(&self) -> &str;

    /// Runs the service until completion or until `ctx` ends.
    ///
    /// Returning the context's cause (`Err(ctx.done().await.into())`) is a normal stop.
    async fn run(&self, ctx: Context) -> Result<(), ServiceError>;
}
