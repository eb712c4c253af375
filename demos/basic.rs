//! # Example: basic
//!
//! Two services under one supervisor, stopped with Ctrl-C.
//!
//! Demonstrates how to:
//! - Define services with [`ServiceFn`].
//! - Read the logger and a shared value from the [`Context`].
//! - Let [`Supervisor::new`] cancel everything on an interrupt signal.
//!
//! ## Flow
//! ```text
//! Supervisor::run()
//!     ├─► bind interrupt (SIGINT/SIGTERM/SIGQUIT) ─► root scope
//!     ├─► ticker.run(ctx)   logs every 500ms
//!     ├─► greeter.run(ctx)  logs once, waits for ctx.done()
//!     └─► Ctrl-C ─► root canceled ─► both return Canceled ─► Ok(())
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example basic
//! ```

use std::time::Duration;

use servisor::{Context, ServiceError, ServiceFn, Supervisor};

#[derive(Clone, Default)]
struct Greeting(&'static str);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Cancels its services on Ctrl-C since no context is supplied
    let sup = Supervisor::new("basic", "0.1.0");
    sup.set(Greeting("hello from the greeter"))?;

    // 2. A service that ticks until canceled
    sup.add_service(ServiceFn::arc("ticker", |ctx: Context| async move {
        let log = ctx.logger();
        let mut n = 0u64;
        loop {
            tokio::select! {
                cause = ctx.done() => return Err::<(), ServiceError>(cause.into()),
                _ = tokio::time::sleep(Duration::from_millis(500)) => {
                    n += 1;
                    log.info(format_args!("tick {n}"));
                }
            }
        }
    }))?;

    // 3. A service that uses a value bound on the supervisor
    sup.add_service(ServiceFn::arc("greeter", |ctx: Context| async move {
        let Greeting(text) = servisor::context::get(&ctx);
        ctx.logger().info(text);
        Err::<(), ServiceError>(ctx.done().await.into())
    }))?;

    println!("press Ctrl-C to stop");
    sup.run().await?;
    Ok(())
}
