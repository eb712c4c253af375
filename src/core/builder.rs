use std::sync::Arc;

use super::{SupervisorConfig, meta, supervisor::Supervisor};
use crate::{context::Context, logging::Logger, subscribers::Subscribe};

/// Builder for constructing a [`Supervisor`] with optional features.
pub struct SupervisorBuilder {
    cfg: SupervisorConfig,
    ctx: Option<Context>,
    logger: Option<Logger>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: SupervisorConfig) -> Self {
        Self {
            cfg,
            ctx: None,
            logger: None,
            subscribers: Vec::new(),
        }
    }

    /// Runs the supervisor on top of `ctx` instead of an interrupt-bound root.
    pub fn with_context(mut self, ctx: Context) -> Self {
        self.ctx = Some(ctx);
        self
    }

    /// Replaces the default logger built from `log_format`.
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive run and service markers through dedicated workers
    /// with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the supervisor, inferring an empty name or version from the executable.
    ///
    /// The logger is resolved here: the one given to [`with_logger`](Self::with_logger),
    /// else one already bound in the context, else one built from `log_format`.
    pub fn build(self) -> Supervisor {
        let mut cfg = self.cfg;
        if cfg.name.is_empty() {
            cfg.name = meta::executable_name();
        }
        if cfg.version.is_empty() {
            cfg.version = meta::executable_version();
        }

        let capture_interrupt = self.ctx.is_none();
        let mut ctx = self.ctx.unwrap_or_default();
        match self.logger {
            Some(logger) => ctx = ctx.with_value(logger),
            None if ctx.value::<Logger>().is_none() => {
                ctx = ctx.with_value(Logger::from_format(cfg.log_format));
            }
            None => {}
        }

        Supervisor::new_internal(cfg, ctx, capture_interrupt, self.subscribers)
    }
}
