//! Error types used by the servisor runtime and services.
//!
//! This module defines two main error enums:
//!
//! - [`ServiceError`]: errors returned by individual services.
//! - [`SupervisorError`]: errors returned by the supervisor itself.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//! [`ServiceError::is_benign`] decides whether a service ended because its context did.

use std::error::Error as StdError;

use thiserror::Error;

use crate::context::Cause;

/// Boxed error carried by [`ServiceError::Fail`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// # Errors produced by service execution.
///
/// `Canceled` and `DeadlineExceeded` are **benign**: the supervisor treats them as a
/// normal stop. Everything else is a failure and cancels the sibling services.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The service stopped because its context was canceled.
    #[error("context canceled")]
    Canceled,

    /// The service stopped because its context deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// The service panicked; the panic was caught by the supervisor.
    #[error("service panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// Any other error returned by the service.
    #[error(transparent)]
    Fail(BoxError),
}

impl ServiceError {
    /// Wraps an arbitrary error as a service failure.
    pub fn fail<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        ServiceError::Fail(err.into())
    }

    /// Builds a failure from a plain message.
    pub fn msg(text: impl Into<String>) -> Self {
        ServiceError::Fail(text.into().into())
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use servisor::ServiceError;
    ///
    /// assert_eq!(ServiceError::Canceled.as_label(), "service_canceled");
    /// assert_eq!(ServiceError::msg("boom").as_label(), "service_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ServiceError::Canceled => "service_canceled",
            ServiceError::DeadlineExceeded => "service_deadline_exceeded",
            ServiceError::Panicked { .. } => "service_panicked",
            ServiceError::Fail(_) => "service_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ServiceError::Canceled => "context canceled".to_string(),
            ServiceError::DeadlineExceeded => "context deadline exceeded".to_string(),
            ServiceError::Panicked { info } => format!("panic: {info}"),
            ServiceError::Fail(err) => format!("error: {err}"),
        }
    }

    /// Reports whether this error only says that the context ended.
    ///
    /// True for [`ServiceError::Canceled`] and [`ServiceError::DeadlineExceeded`], and
    /// for a [`ServiceError::Fail`] that is, or wraps somewhere in its source chain, a
    /// [`Cause`].
    ///
    /// # Example
    /// ```
    /// use servisor::{Cause, ServiceError};
    ///
    /// assert!(ServiceError::DeadlineExceeded.is_benign());
    /// assert!(ServiceError::fail(Cause::Canceled).is_benign());
    /// assert!(!ServiceError::msg("boom").is_benign());
    /// ```
    pub fn is_benign(&self) -> bool {
        match self {
            ServiceError::Canceled | ServiceError::DeadlineExceeded => true,
            ServiceError::Panicked { .. } => false,
            ServiceError::Fail(err) => {
                let mut cur: Option<&(dyn StdError + 'static)> = Some(err.as_ref());
                while let Some(e) = cur {
                    if e.is::<Cause>() {
                        return true;
                    }
                    cur = e.source();
                }
                false
            }
        }
    }
}

impl From<Cause> for ServiceError {
    fn from(cause: Cause) -> Self {
        match cause {
            Cause::Canceled => ServiceError::Canceled,
            Cause::DeadlineExceeded => ServiceError::DeadlineExceeded,
        }
    }
}

/// # Errors produced by the supervisor.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SupervisorError {
    /// First non-benign error returned by a service; it cancelled the whole group.
    #[error("service {service:?} failed: {source}")]
    Service {
        /// Name of the failing service.
        service: String,
        /// The error exactly as the service returned it.
        #[source]
        source: ServiceError,
    },

    /// Registration was attempted after `run` started.
    #[error("supervisor is {state} and no longer accepts registrations")]
    NotAccepting {
        /// State the supervisor was in.
        state: &'static str,
    },

    /// `run` was called a second time.
    #[error("supervisor already started; it can run only once")]
    AlreadyStarted,
}

impl SupervisorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use servisor::SupervisorError;
    ///
    /// assert_eq!(SupervisorError::AlreadyStarted.as_label(), "supervisor_already_started");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SupervisorError::Service { .. } => "supervisor_service_failed",
            SupervisorError::NotAccepting { .. } => "supervisor_not_accepting",
            SupervisorError::AlreadyStarted => "supervisor_already_started",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SupervisorError::Service { service, source } => {
                format!("service={service} {}", source.as_message())
            }
            SupervisorError::NotAccepting { state } => format!("registration rejected; state={state}"),
            SupervisorError::AlreadyStarted => "run called twice".to_string(),
        }
    }

    /// Returns the service error when this is [`SupervisorError::Service`].
    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            SupervisorError::Service { source, .. } => Some(source),
            _ => None,
        }
    }
}
