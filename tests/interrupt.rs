#![cfg(unix)]
//! Runs in its own test binary: SIGINT is delivered to the whole process.

use std::sync::Arc;
use std::time::Duration;

use servisor::{Cause, Context, Logger, ServiceError, ServiceFn, Supervisor, SupervisorConfig};
use tokio::process::Command;
use tokio::signal::unix::{SignalKind, signal};
use tokio::time::{sleep, timeout};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn interrupt_signal_stops_every_service() {
    // Keeps the default SIGINT action (terminate) from firing before the supervisor listens.
    let _sigint = signal(SignalKind::interrupt()).unwrap();

    let sup = Arc::new(
        Supervisor::builder(SupervisorConfig::new("interrupt", "1.0.0"))
            .with_logger(Logger::disabled())
            .build(),
    );
    for name in ["http", "consumer"] {
        sup.add_service(ServiceFn::arc(name, |ctx: Context| async move {
            Err::<(), ServiceError>(ctx.done().await.into())
        }))
        .unwrap();
    }

    let running = tokio::spawn({
        let sup = Arc::clone(&sup);
        async move { sup.run().await }
    });

    let pid = std::process::id().to_string();
    timeout(Duration::from_secs(5), async {
        while !running.is_finished() {
            Command::new("kill")
                .args(["-INT", &pid])
                .status()
                .await
                .unwrap();
            sleep(Duration::from_millis(100)).await;
        }
    })
    .await
    .expect("interrupt did not stop the run");

    let res = running.await.unwrap();
    assert!(res.is_ok(), "unexpected: {res:?}");
    assert_eq!(sup.context().err(), Some(Cause::Canceled));
}
