//! # Supervisor configuration.
//!
//! Provides [`SupervisorConfig`] centralized settings for one supervisor.
//!
//! ## Sentinel values
//! - `name = ""` → file name of the running executable
//! - `version = ""` → modification time of the running executable (`YYYYMMDD-HHMMSS`)
//! - `flush_timeout = 0s` → `run` does not wait for subscribers to drain

use std::time::Duration;

use crate::logging::LogFormat;

/// Configuration for a [`Supervisor`](crate::Supervisor).
///
/// ## Field semantics
/// - `name`, `version`: attached to every log line as `app` / `version`
/// - `log_format`: sink used when no [`Logger`](crate::Logger) is bound in the context
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
/// - `flush_timeout`: upper bound on waiting for subscribers after the last service returned
///
/// All fields are public. Prefer the helper accessors over checking sentinels by hand.
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// Application name; empty means "infer from the executable".
    pub name: String,

    /// Application version; empty means "infer from the executable".
    pub version: String,

    /// Format of the default logger.
    pub log_format: LogFormat,

    /// Capacity of the event bus broadcast channel.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` events skip older items.
    pub bus_capacity: usize,

    /// Maximum time `run` waits for subscribers to process the run's events.
    pub flush_timeout: Duration,
}

impl SupervisorConfig {
    /// Default configuration with an explicit name and version.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the subscriber flush bound as an `Option`.
    ///
    /// - `None` → do not wait
    /// - `Some(d)` → wait up to `d`
    #[inline]
    pub fn flush_limit(&self) -> Option<Duration> {
        if self.flush_timeout == Duration::ZERO {
            None
        } else {
            Some(self.flush_timeout)
        }
    }
}

impl Default for SupervisorConfig {
    /// Default configuration:
    ///
    /// - `name = ""`, `version = ""` (inferred)
    /// - `log_format = LogFormat::Auto`
    /// - `bus_capacity = 1024`
    /// - `flush_timeout = 1s`
    fn default() -> Self {
        Self {
            name: String::new(),
            version: String::new(),
            log_format: LogFormat::Auto,
            bus_capacity: 1024,
            flush_timeout: Duration::from_secs(1),
        }
    }
}
