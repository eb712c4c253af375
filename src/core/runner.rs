//! # Run a single service to completion.
//!
//! Executes one [`Service`] against a branch of the group context, publishes lifecycle
//! events to the [`Bus`], and classifies the outcome.
//!
//! ## Event flow
//!
//! ```text
//! Success:
//!   service.run() → Ok(())                      → publish ServiceStopped
//!
//! Benign stop:
//!   service.run() → Err(Canceled|DeadlineExceeded|wraps a Cause)
//!                                               → publish ServiceStopped, return Ok
//!
//! Failure:
//!   service.run() → Err(other) or panic         → publish ServiceFailed, return Err
//! ```
//!
//! ## Rules
//! - Always publishes **exactly one** terminal event: `ServiceStopped` or `ServiceFailed`
//! - Classification happens here; the aggregator only keeps the first `Err`
//! - The service logger shadows the app logger **only** in this branch of the context

use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::{
    context::Context,
    error::{ServiceError, SupervisorError},
    events::{Bus, Event, EventKind},
    logging::Logger,
    services::ServiceRef,
    subscribers::panic_info,
};

/// Runs `service` under a child of `group` that carries a service-scoped logger.
pub(crate) async fn run_service(
    service: ServiceRef,
    group: Context,
    app_logger: Logger,
    bus: Bus,
) -> Result<(), SupervisorError> {
    let name = service.name().to_owned();
    let logger = app_logger.with_service(&name);
    let ctx = group.with_value(logger.clone());

    logger.info("starting service");
    bus.publish(Event::new(EventKind::ServiceStarting).with_service(name.as_str()));

    let attempt = logger.attach(service.run(ctx));
    let res = match AssertUnwindSafe(attempt).catch_unwind().await {
        Ok(res) => res,
        Err(panic) => Err(ServiceError::Panicked {
            info: panic_info(&*panic),
        }),
    };

    match res {
        Ok(()) => {
            logger.info("service finished");
            publish_stopped(&bus, &name, None);
            Ok(())
        }
        Err(err) if err.is_benign() => {
            logger.info(format_args!("stopped: {err}"));
            publish_stopped(&bus, &name, Some(&err));
            Ok(())
        }
        Err(err) => {
            logger.error(&err);
            publish_failed(&bus, &name, &err);
            Err(SupervisorError::Service {
                service: name,
                source: err,
            })
        }
    }
}

/// Publishes `ServiceStopped` (success or benign termination).
fn publish_stopped(bus: &Bus, name: &str, benign: Option<&ServiceError>) {
    let ev = Event::new(EventKind::ServiceStopped).with_service(name);
    bus.publish(match benign {
        Some(err) => ev.with_reason(err.to_string()),
        None => ev,
    });
}

/// Publishes `ServiceFailed` with error details.
fn publish_failed(bus: &Bus, name: &str, err: &ServiceError) {
    bus.publish(
        Event::new(EventKind::ServiceFailed)
            .with_service(name)
            .with_reason(err.to_string()),
    );
}
