use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use servisor::{Context, Logger, ServiceError, ServiceFn, Supervisor, SupervisorError};
use tokio::time::{Instant, timeout};

const HANG_LIMIT: Duration = Duration::from_secs(5);

fn supervisor(ctx: Context) -> Supervisor {
    Supervisor::with_context(ctx.with_value(Logger::disabled()), "scenarios", "1.0.0")
}

fn waits_for_cancel(name: &'static str) -> servisor::ServiceRef {
    ServiceFn::arc(name, |ctx: Context| async move {
        Err::<(), ServiceError>(ctx.done().await.into())
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn services_returning_immediately_complete_ok() {
    let sup = supervisor(Context::background());
    for name in ["a", "b", "c"] {
        sup.add_service(ServiceFn::arc(name, |_ctx: Context| async {
            Ok::<(), ServiceError>(())
        }))
        .unwrap();
    }

    let res = timeout(HANG_LIMIT, sup.run()).await.expect("run hung");
    assert!(res.is_ok(), "unexpected: {res:?}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn first_failure_cancels_blocked_siblings() {
    let sup = supervisor(Context::background());
    sup.add_service(waits_for_cancel("http")).unwrap();
    sup.add_service(ServiceFn::arc("db", |_ctx: Context| async {
        Err::<(), ServiceError>(ServiceError::msg("connection refused"))
    }))
    .unwrap();
    sup.add_service(waits_for_cancel("consumer")).unwrap();

    let res = timeout(HANG_LIMIT, sup.run()).await.expect("run hung");
    match res {
        Err(SupervisorError::Service { service, source }) => {
            assert_eq!(service, "db");
            assert_eq!(source.to_string(), "connection refused");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn root_deadline_is_a_normal_stop() {
    let (ctx, _cancel) = Context::background().with_timeout(Duration::from_secs(1));
    let sup = supervisor(ctx);
    sup.add_service(waits_for_cancel("ticker")).unwrap();

    let started = Instant::now();
    let res = timeout(HANG_LIMIT, sup.run()).await.expect("run hung");
    let elapsed = started.elapsed();

    assert!(res.is_ok(), "unexpected: {res:?}");
    assert!(elapsed >= Duration::from_millis(900), "stopped early: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(3), "stopped late: {elapsed:?}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_failures_report_exactly_one() {
    let sup = supervisor(Context::background());
    sup.add_service(ServiceFn::arc("left", |_ctx: Context| async {
        Err::<(), ServiceError>(ServiceError::msg("left failed"))
    }))
    .unwrap();
    sup.add_service(ServiceFn::arc("right", |_ctx: Context| async {
        Err::<(), ServiceError>(ServiceError::msg("right failed"))
    }))
    .unwrap();

    let res = timeout(HANG_LIMIT, sup.run()).await.expect("run hung");
    let err = res.expect_err("expected a failure");
    let reason = err
        .service_error()
        .map(ToString::to_string)
        .unwrap_or_default();
    assert!(
        reason == "left failed" || reason == "right failed",
        "unexpected: {err}"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn duplicate_names_both_run() {
    let sup = supervisor(Context::background());
    let runs = Arc::new(AtomicUsize::new(0));
    for _ in 0..2 {
        let runs = Arc::clone(&runs);
        sup.add_service(ServiceFn::arc("worker", move |_ctx: Context| {
            let runs = Arc::clone(&runs);
            async move {
                runs.fetch_add(1, Ordering::SeqCst);
                Ok::<(), ServiceError>(())
            }
        }))
        .unwrap();
    }

    timeout(HANG_LIMIT, sup.run())
        .await
        .expect("run hung")
        .unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn caller_cancellation_stops_every_service() {
    let (ctx, cancel) = Context::background().with_cancel();
    let sup = Arc::new(supervisor(ctx));
    sup.add_service(waits_for_cancel("a")).unwrap();
    sup.add_service(waits_for_cancel("b")).unwrap();

    let running = tokio::spawn({
        let sup = Arc::clone(&sup);
        async move { sup.run().await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let late = sup.add_service(waits_for_cancel("late"));
    assert!(matches!(late, Err(SupervisorError::NotAccepting { state: "running" })));

    cancel.cancel();
    let res = timeout(HANG_LIMIT, running)
        .await
        .expect("run hung")
        .unwrap();
    assert!(res.is_ok(), "unexpected: {res:?}");
    assert!(matches!(sup.run().await, Err(SupervisorError::AlreadyStarted)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn services_see_values_bound_before_run() {
    #[derive(Clone, Default, Debug, PartialEq)]
    struct Settings {
        addr: String,
    }

    let sup = supervisor(Context::background());
    sup.set(Settings { addr: "127.0.0.1:8080".into() }).unwrap();
    sup.add_service(ServiceFn::arc("reader", |ctx: Context| async move {
        let settings: Settings = servisor::context::get(&ctx);
        if settings.addr == "127.0.0.1:8080" {
            Ok(())
        } else {
            Err(ServiceError::msg("settings missing"))
        }
    }))
    .unwrap();

    timeout(HANG_LIMIT, sup.run())
        .await
        .expect("run hung")
        .unwrap();
}
