//! # LogWriter: simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for tests or demos; real deployments should log through the
//! [`Logger`](crate::Logger) capability or a custom [`Subscribe`].
//!
//! ## Example output
//! ```text
//! [run-starting] app="demo"
//! [starting] service="http"
//! [failed] service="db" err="connection refused"
//! [group-canceled] by="db" err="connection refused"
//! [stopped] service="http"
//! [run-finished] app="demo" err="service \"db\" failed: connection refused"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let name = e.service.as_deref().unwrap_or("unknown");
        match e.kind {
            EventKind::RunStarting => println!("[run-starting] app={name:?}"),
            EventKind::RunFinished => match &e.reason {
                Some(err) => println!("[run-finished] app={name:?} err={err:?}"),
                None => println!("[run-finished] app={name:?}"),
            },
            EventKind::InterruptReceived => println!("[interrupt]"),
            EventKind::GroupCanceled => {
                println!("[group-canceled] by={name:?} err={:?}", e.reason)
            }
            EventKind::ServiceStarting => println!("[starting] service={name:?}"),
            EventKind::ServiceStopped => println!("[stopped] service={name:?}"),
            EventKind::ServiceFailed => {
                println!("[failed] service={name:?} err={:?}", e.reason)
            }
            EventKind::SubscriberOverflow => {
                println!("[subscriber-overflow] subscriber={name:?} reason={:?}", e.reason)
            }
            EventKind::SubscriberPanicked => println!(
                "[subscriber-panicked] subscriber={name} info={}",
                e.reason.as_deref().unwrap_or("unknown"),
            ),
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
