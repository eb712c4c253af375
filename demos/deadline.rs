//! # Example: deadline
//!
//! The caller owns the root context and gives it a deadline. No interrupt handler is
//! installed; expiry stops every service and counts as a normal stop.
//!
//! ## Run
//! ```bash
//! cargo run --example deadline
//! ```

use std::time::Duration;

use servisor::{Context, LogFormat, ServiceError, ServiceFn, Supervisor, SupervisorConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (ctx, _cancel) = Context::background().with_timeout(Duration::from_secs(2));

    let mut cfg = SupervisorConfig::new("deadline", "0.1.0");
    cfg.log_format = LogFormat::Json;
    let sup = Supervisor::builder(cfg).with_context(ctx).build();

    sup.add_service(ServiceFn::arc("poller", |ctx: Context| async move {
        // Per-request scopes derive from the service context.
        loop {
            let (req, _done) = ctx.with_timeout(Duration::from_millis(300));
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(500)) => {}
                cause = req.done() => ctx.logger().warn(format_args!("poll gave up: {cause}")),
            }
            if let Some(cause) = ctx.err() {
                return Err::<(), ServiceError>(cause.into());
            }
        }
    }))?;

    sup.run().await?;
    println!("deadline reached, clean exit");
    Ok(())
}
