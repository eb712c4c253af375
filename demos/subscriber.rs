//! # Example: subscriber
//!
//! Attaches the built-in [`LogWriter`] and a custom [`Subscribe`] implementation.
//!
//! ## Flow
//! ```text
//! runner / supervisor ── publish(Event) ──► Bus ──► SubscriberSet
//!                                                      ├─► LogWriter.on_event()
//!                                                      └─► Counter.on_event()
//! ```
//!
//! ## Run
//! Requires the `logging` feature to export [`LogWriter`].
//! ```bash
//! cargo run --example subscriber --features logging
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use servisor::{
    Context, Event, EventKind, LogWriter, Logger, ServiceError, ServiceFn, ServiceRef, Subscribe,
    Supervisor, SupervisorConfig,
};

/// Counts services that failed.
#[derive(Default)]
struct Counter {
    failed: AtomicUsize,
}

#[async_trait::async_trait]
impl Subscribe for Counter {
    async fn on_event(&self, event: &Event) {
        if event.kind == EventKind::ServiceFailed {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn name(&self) -> &'static str {
        "counter"
    }
}

#[tokio::main]
async fn main() {
    let counter = Arc::new(Counter::default());
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new()), counter.clone()];

    let (ctx, _cancel) = Context::background().with_timeout(Duration::from_secs(1));
    let sup = Supervisor::builder(SupervisorConfig::new("subscriber", "0.1.0"))
        .with_context(ctx)
        .with_logger(Logger::disabled())
        .with_subscribers(subs)
        .build();

    let services: [ServiceRef; 2] = [
        ServiceFn::arc("worker", |ctx: Context| async move {
            Err::<(), ServiceError>(ctx.done().await.into())
        }),
        ServiceFn::arc("flaky", |_ctx: Context| async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Err::<(), ServiceError>(ServiceError::msg("lost connection"))
        }),
    ];
    for service in services {
        let _ = sup.add_service(service);
    }

    let res = sup.run().await;
    println!(
        "result: {res:?}, failed services: {}",
        counter.failed.load(Ordering::Relaxed)
    );
}
