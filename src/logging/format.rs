//! # Default log sink selection.
//!
//! | Format   | Output | Level (without `RUST_LOG`) | Notes                      |
//! |----------|--------|----------------------------|----------------------------|
//! | `Pretty` | stdout | `DEBUG`                    | ANSI colors, span prefixes |
//! | `Json`   | stdout | `WARN`                     | one object per line        |
//! | `Auto`   | stdout | depends                    | `Pretty` on a terminal, else `Json` |
//!
//! `RUST_LOG` takes [`EnvFilter`] directives (`info`, `servisor=debug,hyper=warn`, ...)
//! and overrides the default level. Spans are always enabled so that `app`/`service`
//! fields reach every event that passes the filter.

use std::io::{self, IsTerminal};

use tracing::{Dispatch, Level, Metadata};
use tracing_subscriber::{
    EnvFilter,
    filter::{self, FilterExt, LevelFilter},
    fmt::{self, MakeWriter},
    prelude::*,
};

/// Output format of the default logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Pick [`LogFormat::Pretty`] when stdout is a terminal, [`LogFormat::Json`] otherwise.
    #[default]
    Auto,
    /// Human-readable, colored output.
    Pretty,
    /// Structured JSON lines.
    Json,
}

impl LogFormat {
    /// Resolves `Auto` against the current stdout; other variants are returned as is.
    pub fn resolve(self) -> LogFormat {
        match self {
            LogFormat::Auto if io::stdout().is_terminal() => LogFormat::Pretty,
            LogFormat::Auto => LogFormat::Json,
            other => other,
        }
    }

    /// Most verbose level enabled when `RUST_LOG` does not say otherwise.
    pub fn default_level(self) -> Level {
        match self.resolve() {
            LogFormat::Pretty => Level::DEBUG,
            _ => Level::WARN,
        }
    }
}

/// Event filter of the default logger: `RUST_LOG` directives, else `format`'s level.
fn env_filter(format: LogFormat) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(format.default_level()).into())
        .from_env_lossy()
}

pub(crate) fn build_dispatch(format: LogFormat) -> Dispatch {
    let format = format.resolve();
    build_dispatch_with(format, env_filter(format), io::stdout)
}

fn build_dispatch_with<W>(format: LogFormat, events: EnvFilter, writer: W) -> Dispatch
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let keep = filter::filter_fn(|meta: &Metadata<'_>| meta.is_span()).or(events);

    match format {
        LogFormat::Json => Dispatch::new(
            tracing_subscriber::registry().with(
                fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_file(true)
                    .with_line_number(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_filter(keep),
            ),
        ),
        _ => Dispatch::new(
            tracing_subscriber::registry().with(
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(format == LogFormat::Pretty)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(keep),
            ),
        ),
    }
}
