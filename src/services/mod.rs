//! # Service abstractions.
//!
//! This module provides the service-related types:
//! - [`Service`] - trait for named, long-lived async units of work
//! - [`ServiceFn`] - function-backed service implementation
//! - [`ServiceRef`] - shared reference to a service (`Arc<dyn Service>`)

mod service;
mod service_fn;

pub use service::{Service, ServiceRef};
pub use service_fn::ServiceFn;
