//! # Example: fail_fast
//!
//! One failing service takes the whole group down.
//!
//! ## Flow
//! ```text
//! Supervisor::run()
//!     ├─► http.run(ctx)      waits for ctx.done()
//!     ├─► consumer.run(ctx)  waits for ctx.done()
//!     ├─► db.run(ctx)        fails after 300ms
//!     │     └─► group canceled ─► http, consumer return Canceled
//!     └─► Err(service "db" failed: connection refused)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example fail_fast
//! ```

use std::time::Duration;

use servisor::{Context, ServiceError, ServiceFn, ServiceRef, Supervisor};

fn idle(name: &'static str) -> ServiceRef {
    ServiceFn::arc(name, |ctx: Context| async move {
        ctx.logger().info("serving");
        let cause = ctx.done().await;
        ctx.logger().info(format_args!("shutting down: {cause}"));
        Err::<(), ServiceError>(cause.into())
    })
}

#[tokio::main]
async fn main() {
    let (ctx, _cancel) = Context::background().with_cancel();
    let sup = Supervisor::with_context(ctx, "fail-fast", "0.1.0");

    let db: ServiceRef = ServiceFn::arc("db", |_ctx: Context| async {
        tokio::time::sleep(Duration::from_millis(300)).await;
        Err::<(), ServiceError>(ServiceError::msg("connection refused"))
    });

    for service in [idle("http"), idle("consumer"), db] {
        if let Err(err) = sup.add_service(service) {
            eprintln!("{err}");
            return;
        }
    }

    match sup.run().await {
        Ok(()) => println!("all services stopped"),
        Err(err) => println!("run failed [{}]: {err}", err.as_label()),
    }
}
