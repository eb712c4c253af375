use std::fmt;
use std::future::Future;

use tracing::instrument::{Instrument, WithSubscriber};
use tracing::{Dispatch, Span, dispatcher};

use super::format::{LogFormat, build_dispatch};
use crate::context::Context;

/// Leveled, structured logger passed to services through the context.
///
/// Cloning is cheap. Derived loggers ([`with_app`](Self::with_app),
/// [`with_service`](Self::with_service)) share the sink and add fields; the parent
/// is left as it was.
#[derive(Clone)]
pub struct Logger {
    dispatch: Dispatch,
    span: Span,
}

impl Logger {
    /// Wraps an existing `tracing` dispatcher.
    pub fn new(dispatch: Dispatch) -> Self {
        Self {
            dispatch,
            span: Span::none(),
        }
    }

    /// Logger writing to whatever dispatcher is the default at the call site.
    pub fn current() -> Self {
        Self::new(dispatcher::get_default(Dispatch::clone))
    }

    /// Logger that discards everything.
    pub fn disabled() -> Self {
        Self::new(Dispatch::none())
    }

    /// Builds the default stdout logger for `format`.
    pub fn from_format(format: LogFormat) -> Self {
        Self::new(build_dispatch(format))
    }

    /// Derives a logger carrying `app` and `version` fields.
    pub fn with_app(&self, app: &str, version: &str) -> Self {
        let span = dispatcher::with_default(&self.dispatch, || {
            tracing::info_span!(parent: &self.span, "app", app = %app, version = %version)
        });
        self.derive(span)
    }

    /// Derives a logger carrying a `service` field.
    pub fn with_service(&self, service: &str) -> Self {
        let span = dispatcher::with_default(&self.dispatch, || {
            tracing::info_span!(parent: &self.span, "service", service = %service)
        });
        self.derive(span)
    }

    /// Span holding this logger's fields.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Underlying dispatcher.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Runs `fut` inside this logger's span with its dispatcher as the default, so
    /// plain `tracing` macros used by `fut` reach this logger.
    pub fn attach<F>(&self, fut: F) -> impl Future<Output = F::Output>
    where
        F: Future,
    {
        fut.instrument(self.span.clone())
            .with_subscriber(self.dispatch.clone())
    }

    /// Logs `message` at `DEBUG` with this logger's fields.
    pub fn debug(&self, message: impl fmt::Display) {
        dispatcher::with_default(&self.dispatch, || {
            tracing::debug!(parent: &self.span, "{message}")
        });
    }

    /// Logs `message` at `INFO`.
    pub fn info(&self, message: impl fmt::Display) {
        dispatcher::with_default(&self.dispatch, || {
            tracing::info!(parent: &self.span, "{message}")
        });
    }

    /// Logs `message` at `WARN`.
    pub fn warn(&self, message: impl fmt::Display) {
        dispatcher::with_default(&self.dispatch, || {
            tracing::warn!(parent: &self.span, "{message}")
        });
    }

    /// Logs `message` at `ERROR`.
    pub fn error(&self, message: impl fmt::Display) {
        dispatcher::with_default(&self.dispatch, || {
            tracing::error!(parent: &self.span, "{message}")
        });
    }

    fn derive(&self, span: Span) -> Self {
        Self {
            dispatch: self.dispatch.clone(),
            span,
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("span", &self.span.metadata().map(|m| m.name()))
            .finish()
    }
}

impl Context {
    /// Returns the logger bound on this context, or [`Logger::current`].
    pub fn logger(&self) -> Logger {
        self.value::<Logger>().unwrap_or_else(Logger::current)
    }
}
