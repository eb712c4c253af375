//! # Function-backed service (`ServiceFn`)
//!
//! [`ServiceFn`] wraps a closure `F: Fn(Context) -> Fut`, producing a fresh future per
//! run. If the closure needs shared state, capture an `Arc<...>` explicitly.
//!
//! ## Example
//! ```rust
//! use servisor::{Context, ServiceFn, ServiceRef, ServiceError};
//!
//! let s: ServiceRef = ServiceFn::arc("worker", |ctx: Context| async move {
//!     let cause = ctx.done().await;
//!     Err::<(), ServiceError>(cause.into())
//! });
//!
//! assert_eq!(s.name(), "worker");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::Context;
use crate::error::ServiceError;
use crate::services::Service;

/// Function-backed service implementation.
#[derive(Debug)]
pub struct ServiceFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ServiceFn<F> {
    /// Creates a new function-backed service.
    ///
    /// Prefer [`ServiceFn::arc`] when you immediately need a [`ServiceRef`](crate::ServiceRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the service and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Service for ServiceFn<F>
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ServiceError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: Context) -> Result<(), ServiceError> {
        (self.f)(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ServiceRef;

    #[tokio::test]
    async fn test_service_fn_runs_closure() {
        let srv = ServiceFn::new("basic", |ctx: Context| async move {
            ctx.logger().info("hi");
            Err::<(), _>(ServiceError::msg("hi"))
        });
        assert_eq!(srv.name(), "basic");

        let err = srv.run(Context::background()).await.unwrap_err();
        assert_eq!(err.to_string(), "hi");
    }

    #[tokio::test]
    async fn test_each_run_builds_fresh_future() {
        let srv: ServiceRef = ServiceFn::arc(String::from("twice"), |_ctx: Context| async {
            Ok::<(), ServiceError>(())
        });
        assert!(srv.run(Context::background()).await.is_ok());
        assert!(srv.run(Context::background()).await.is_ok());
    }
}
